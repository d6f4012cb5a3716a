mod category_column;
mod classify_dialog;
mod group_manager;
mod item_card;
mod modal_host;
mod tag_editor;
mod template_manager;

pub use category_column::CategoryColumn;
pub use classify_dialog::ClassifyDialogView;
pub use group_manager::GroupBar;
pub use item_card::ItemCard;
pub use modal_host::{ModalHost, ModalNotifier};
pub use tag_editor::TagEditorView;
pub use template_manager::TemplateBar;
