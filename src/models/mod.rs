pub mod loaders;
pub mod params;
pub mod result_set;
pub mod stage;

pub use loaders::{load_params_from_toml, parse_params};
pub use params::{CognitiveLevels, InputParameters, QuestionTypeDistribution};
pub use result_set::ResultSet;
pub use stage::{Stage, Step};
