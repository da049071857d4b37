pub mod glass_panel;
pub mod mosaic_intro;
pub mod tree_scene;
