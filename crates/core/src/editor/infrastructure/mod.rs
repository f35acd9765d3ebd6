pub mod monospace_layout;
