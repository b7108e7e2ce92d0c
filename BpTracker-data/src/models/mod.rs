pub mod blood_pressure;
