pub mod confirm_dialog;
pub mod help_overlay;
pub mod issue_list;
pub mod pane_viewer;
