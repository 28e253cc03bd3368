use cardpull_core::banner::BannerBias;
use cardpull_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `banners` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Banner {
    pub name: String,
    pub focus_labels: Vec<String>,
    pub bonus_percent: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Banner {
    pub fn bias(&self) -> BannerBias {
        BannerBias::new(&self.focus_labels, self.bonus_percent)
    }
}

/// Input for creating or replacing a banner.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveBanner {
    pub name: String,
    pub focus_labels: Vec<String>,
    pub bonus_percent: i32,
}
