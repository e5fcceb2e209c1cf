pub mod attendance;
pub mod lottery;
pub mod points;
pub mod redemption;
pub mod schedule;
pub mod student;
