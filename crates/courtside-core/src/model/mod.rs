// Shared data shapes consumed by the best-ball and round-robin engines.

pub mod category;
pub mod player;
pub mod position;

pub use category::{
    format_count, format_percentage, Category, CategoryRule, CategoryRules, CategoryValue,
    Direction, TeamCategoryLine,
};
pub use player::{PlayerStatLine, TeamWeekResult, WeeklyBestBallSnapshot};
pub use position::{parse_position_list, BestBallSlot, Position};
