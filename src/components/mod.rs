pub mod hooks;
pub mod section_list;
pub mod ui;

pub use section_list::SectionList;
