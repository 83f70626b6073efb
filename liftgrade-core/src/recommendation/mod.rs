pub mod engine;

pub use self::engine::{
    Adjustment, AdjustmentKind, PrescriptionInput, adjust_prescription, deload_weight,
    overload_weight,
};
