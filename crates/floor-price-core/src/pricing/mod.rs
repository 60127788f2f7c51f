//! Floor price pipeline: speed pricing, installation, floors per customer type.

pub mod floor;
pub mod installation;
pub mod speed;
pub mod weighted;

pub use floor::{compute_floor, FloorPriceBreakdown, FloorRequest};
pub use installation::{
    compute_installation, installation_fee, validate_distance, InstallationDetails,
};
pub use speed::{quote_speed, ExtrapolationDirection, InterpolationInfo, SpeedPoint, SpeedQuote};
pub use weighted::{amortize_installation, compute_weighted_floor, WeightedFloorResult};
