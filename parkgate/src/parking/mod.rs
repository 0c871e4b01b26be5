// parkgate/src/parking/mod.rs

pub mod fee;
pub mod ledger;

pub use fee::{ElapsedSeconds, FeePolicy, HourlyRate};
pub use ledger::{ParkedVehicle, ParkingLedger, ParkingRow, Visit};
