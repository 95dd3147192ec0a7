mod exchange_bar;
mod filter_bar;
mod notice;
mod stats_bar;
mod task_form;
mod task_list;

pub use exchange_bar::ExchangeBar;
pub use filter_bar::FilterBar;
pub use notice::{Notice, NoticeMessage};
pub use stats_bar::StatsBar;
pub use task_form::TaskForm;
pub use task_list::TaskList;
