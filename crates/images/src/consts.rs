/// The maximum file size that an image can be in order to be classified.
///
/// This value is in MiB.
pub const GENERIC_MAXIMUM_FILE_SIZE: u64 = MIB * 24;

/// Spatial resolution (width, height) expected by MobileNetV2 and the models fine-tuned from it.
pub const DEFAULT_INPUT_SIZE: (u32, u32) = (224, 224);

/// The size of 1MiB in bytes
const MIB: u64 = 1_048_576;
