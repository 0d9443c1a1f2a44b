mod common;
mod inputbar;
