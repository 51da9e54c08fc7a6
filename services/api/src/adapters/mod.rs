pub mod db;
pub mod judge;

pub use db::DbAdapter;
pub use judge::HttpJudgeAdapter;
