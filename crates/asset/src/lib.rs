//! CPU-side assets: meshes, textures, typeface fonts and the geometry
//! generators built on them, plus the background asset loader.

pub mod font;
pub mod loader;
pub mod mesh;
pub mod primitives;
pub mod text;
pub mod texture;
