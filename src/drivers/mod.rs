//! Drivers usados pelo próprio núcleo.
//!
//! Apenas o sink serial dos logs. Drivers de dispositivo de verdade
//! vivem fora desta crate.

pub mod serial;
