// Image-recognition signals as an alternative event source.

pub mod annotations;
pub mod classifier;
