// Bus interface - CPU-facing boundary of the APU
//
// The host CPU emulator owns address decoding for the whole system and
// forwards accesses in the APU block to the device:
//
// ```text
// $4000-$4013: Channel registers
// $4015:       Status
// $4017:       Frame sequencer
// ```

/// Trait for memory-mapped components
///
/// This trait defines the interface for components that can be mapped into the
/// CPU's address space. The [`Apu`](crate::apu::Apu) implements it for its
/// register block.
pub trait MemoryMappedDevice {
    /// Read a byte from the device
    ///
    /// Some devices have side effects on read (e.g., reading the APU status
    /// acknowledges the frame interrupt), so this method takes &mut self.
    ///
    /// # Arguments
    /// * `addr` - The CPU address to read from
    ///
    /// # Returns
    /// The byte value at the specified address
    fn read(&mut self, addr: u16) -> u8;

    /// Write a byte to the device
    ///
    /// # Arguments
    /// * `addr` - The CPU address to write to
    /// * `data` - The byte value to write
    fn write(&mut self, addr: u16, data: u8);
}
