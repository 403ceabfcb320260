pub mod activity;
pub mod message;
pub mod profile;
pub mod user;

use strum_macros::{Display, EnumString};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// 表格里写的是中文
    pub fn from_cn(s: &str) -> Option<Self> {
        match s.trim() {
            "男" => Some(Gender::Male),
            "女" => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn cn(&self) -> &'static str {
        match self {
            Gender::Male => "男",
            Gender::Female => "女",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GenderRestriction {
    Unrestricted,
    Male,
    Female,
}

impl GenderRestriction {
    pub fn admits(&self, gender: &str) -> bool {
        match self {
            GenderRestriction::Unrestricted => true,
            GenderRestriction::Male => gender == Gender::Male.to_string(),
            GenderRestriction::Female => gender == Gender::Female.to_string(),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityStatus {
    Open,
    InProgress,
    Closed,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Rank {
    Trainee,
    Bronze,
    Silver,
    Gold,
    Diamond,
}

impl Rank {
    pub fn of_level(level: i32) -> Self {
        match level {
            l if l <= 10 => Rank::Trainee,
            l if l <= 30 => Rank::Bronze,
            l if l <= 60 => Rank::Silver,
            l if l <= 100 => Rank::Gold,
            _ => Rank::Diamond,
        }
    }

    pub fn cn(&self) -> &'static str {
        match self {
            Rank::Trainee => "见习志愿者",
            Rank::Bronze => "铜牌志愿者",
            Rank::Silver => "银牌志愿者",
            Rank::Gold => "金牌志愿者",
            Rank::Diamond => "钻石志愿者",
        }
    }
}

pub fn xp_in_level(xp: i32) -> i32 {
    xp % 100
}

pub fn next_level_xp(xp: i32) -> i32 {
    (xp / 100 + 1) * 100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_tiers_at_boundaries() {
        assert_eq!(Rank::of_level(0), Rank::Trainee);
        assert_eq!(Rank::of_level(10), Rank::Trainee);
        assert_eq!(Rank::of_level(11), Rank::Bronze);
        assert_eq!(Rank::of_level(30), Rank::Bronze);
        assert_eq!(Rank::of_level(31), Rank::Silver);
        assert_eq!(Rank::of_level(60), Rank::Silver);
        assert_eq!(Rank::of_level(61), Rank::Gold);
        assert_eq!(Rank::of_level(100), Rank::Gold);
        assert_eq!(Rank::of_level(101), Rank::Diamond);
    }

    #[test]
    fn gender_restriction_admits() {
        assert!(GenderRestriction::Unrestricted.admits("MALE"));
        assert!(GenderRestriction::Unrestricted.admits("FEMALE"));
        assert!(GenderRestriction::Male.admits("MALE"));
        assert!(!GenderRestriction::Male.admits("FEMALE"));
        assert!(!GenderRestriction::Female.admits("MALE"));
    }

    #[test]
    fn gender_from_spreadsheet() {
        assert_eq!(Gender::from_cn(" 男 "), Some(Gender::Male));
        assert_eq!(Gender::from_cn("女"), Some(Gender::Female));
        assert_eq!(Gender::from_cn("其他"), None);
    }

    #[test]
    fn xp_progress_within_level() {
        assert_eq!(xp_in_level(0), 0);
        assert_eq!(xp_in_level(130), 30);
        assert_eq!(next_level_xp(130), 200);
        assert_eq!(next_level_xp(99), 100);
    }
}
