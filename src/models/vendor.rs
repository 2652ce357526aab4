use serde::{Deserialize, Serialize};
use std::fmt;

// Три независимых билетных платформы. Порядок вариантов = приоритет
// при атрибуции свободного места в объединённой картине.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    Biletyna,
    Ebilet,
    Kupbilecik,
}

impl Vendor {
    /// Порядок приоритета источников (biletyna раздаёт каноническую схему секторов).
    pub const PRIORITY: [Vendor; 3] = [Vendor::Biletyna, Vendor::Ebilet, Vendor::Kupbilecik];

    /// Референсный источник, чья разбивка на сектора считается канонической.
    pub const REFERENCE: Vendor = Vendor::Biletyna;

    pub fn as_str(&self) -> &'static str {
        match self {
            Vendor::Biletyna => "biletyna",
            Vendor::Ebilet => "ebilet",
            Vendor::Kupbilecik => "kupbilecik",
        }
    }

    pub fn parse(s: &str) -> Option<Vendor> {
        match s.trim().to_lowercase().as_str() {
            "biletyna" => Some(Vendor::Biletyna),
            "ebilet" => Some(Vendor::Ebilet),
            "kupbilecik" => Some(Vendor::Kupbilecik),
            _ => None,
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
