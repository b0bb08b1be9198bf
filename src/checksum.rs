/// Sums all bytes modulo 256.
///
/// This is the only integrity check the sensor protocol has, used for both
/// command and reply frames over different byte ranges.
pub fn sum256(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}
