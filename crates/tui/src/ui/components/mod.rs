pub mod card;
pub mod field;
pub mod money;
pub mod tabs;
pub mod toast;
