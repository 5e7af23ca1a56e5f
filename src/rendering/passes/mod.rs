pub mod scene_pass;
