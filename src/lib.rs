//! A path tracer: closed-enum geometry and materials behind a BVH, lit by an
//! iterative bounce integrator and rendered in parallel scanline bands.

pub mod bounds;
pub mod bvh;
pub mod camera;
pub mod color;
pub mod film;
pub mod hittables;
pub mod integrator;
pub mod material;
pub mod ray;
pub mod textures;
pub mod utils;
pub mod world;

// public: commandline parser
pub mod cli;
// public: renderer functionality
pub mod render;
// public: scene files
pub mod scene;
