pub mod comic_store;
