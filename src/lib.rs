pub mod app;
pub mod camera;
pub mod cli;
pub mod gpu;
pub mod orbit;
pub mod overlay;
pub mod params;
pub mod post;
pub mod renderer;
pub mod scene;
pub mod screenshot;
pub mod time;

pub use app::{App, DemoConfig};
pub use camera::Camera;
pub use orbit::OrbitControls;
pub use params::DemoParams;
pub use scene::Scene;
