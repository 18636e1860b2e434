//! Fixed label sets shared by the seed generator and the maintenance jobs.
//!
//! `INDUSTRIES` is the canonical industry label set: the normalizer maps every
//! known spelling onto one of these, and the seed generator only ever emits them.

pub const PREFECTURES: [&str; 47] = [
    "北海道",
    "青森県",
    "岩手県",
    "宮城県",
    "秋田県",
    "山形県",
    "福島県",
    "茨城県",
    "栃木県",
    "群馬県",
    "埼玉県",
    "千葉県",
    "東京都",
    "神奈川県",
    "新潟県",
    "富山県",
    "石川県",
    "福井県",
    "山梨県",
    "長野県",
    "岐阜県",
    "静岡県",
    "愛知県",
    "三重県",
    "滋賀県",
    "京都府",
    "大阪府",
    "兵庫県",
    "奈良県",
    "和歌山県",
    "鳥取県",
    "島根県",
    "岡山県",
    "広島県",
    "山口県",
    "徳島県",
    "香川県",
    "愛媛県",
    "高知県",
    "福岡県",
    "佐賀県",
    "長崎県",
    "熊本県",
    "大分県",
    "宮崎県",
    "鹿児島県",
    "沖縄県",
];

pub const INDUSTRIES: [&str; 7] = [
    "デリヘル",
    "ホテヘル",
    "箱ヘル",
    "ソープ",
    "DC",
    "風エス",
    "メンエス",
];

pub const AREAS: [&str; 8] = [
    "吉原",
    "すすきの",
    "中洲",
    "歌舞伎町",
    "福原",
    "川崎堀之内",
    "梅田",
    "錦三",
];

pub const GENRES: [&str; 5] = ["熟女", "学園系", "スタンダード", "格安店", "高級店"];

pub const WORK_TYPES: [&str; 2] = ["在籍", "出稼ぎ"];

/// Store-name stem used for each industry in generated data.
pub fn industry_title(industry: &str) -> Option<&'static str> {
    match industry {
        "デリヘル" => Some("ルミナリエ"),
        "ホテヘル" => Some("ロゼクラブ"),
        "箱ヘル" => Some("ラウンジ"),
        "ソープ" => Some("オアシス"),
        "DC" => Some("ダイヤ"),
        "風エス" => Some("スパ"),
        "メンエス" => Some("スタジオ"),
        _ => None,
    }
}

pub fn is_canonical_industry(label: &str) -> bool {
    INDUSTRIES.contains(&label)
}
