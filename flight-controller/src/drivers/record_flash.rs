use core::fmt::{self, Display, Formatter};

use byteorder::{ByteOrder, LittleEndian};
use crc::{Crc, CRC_32_ISO_HDLC};
use embedded_storage::{ReadStorage, Storage};

use crate::{
    config::constants::{FLASH_PAGE_SIZE, FLASH_RECORDS_ADDR, RECORD_TAGS, RECORD_VERSION},
    util::error::StoreError,
};

const PAGE_CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

// [tag:4][version:1][reserved:1][len:u16][crc:u32]
const HEADER_SIZE: usize = 12;
pub const MAX_RECORD_SIZE: usize = FLASH_PAGE_SIZE - HEADER_SIZE;

/// Four character record tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordId([u8; 4]);

impl RecordId {
    pub const fn new(tag: [u8; 4]) -> Self {
        Self(tag)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{}", byte as char)?;
        }
        Ok(())
    }
}

/// Durable storage for small named records.
pub trait RecordStore {
    fn write_record(&mut self, id: RecordId, data: &[u8]) -> Result<(), StoreError>;

    /// Copies the record payload into `buffer` and returns its length.
    fn read_record(&mut self, id: RecordId, buffer: &mut [u8]) -> Result<usize, StoreError>;
}

/// Record store that reserves one flash page per known tag. No wear
/// leveling, each write rewrites the tag's page in place.
pub struct FlashRecordStore<S> {
    flash: S,
    base_address: u32,
}

impl<S: Storage> FlashRecordStore<S> {
    pub fn new(flash: S) -> Self {
        Self::with_base_address(flash, FLASH_RECORDS_ADDR)
    }

    pub fn with_base_address(flash: S, base_address: u32) -> Self {
        Self {
            flash,
            base_address,
        }
    }

    pub fn into_inner(self) -> S {
        self.flash
    }

    fn page_address(&self, id: RecordId) -> Result<u32, StoreError> {
        let index = RECORD_TAGS
            .iter()
            .position(|tag| *tag == id)
            .ok_or(StoreError::UnknownTag)?;
        let address = self.base_address + (index * FLASH_PAGE_SIZE) as u32;
        if address as usize + FLASH_PAGE_SIZE > self.flash.capacity() {
            return Err(StoreError::Device("record page outside flash"));
        }
        Ok(address)
    }
}

impl<S: Storage> RecordStore for FlashRecordStore<S> {
    fn write_record(&mut self, id: RecordId, data: &[u8]) -> Result<(), StoreError> {
        if data.len() > MAX_RECORD_SIZE {
            return Err(StoreError::RecordTooLarge {
                size: data.len(),
                max: MAX_RECORD_SIZE,
            });
        }
        let address = self.page_address(id)?;

        let mut page = [0xFF_u8; FLASH_PAGE_SIZE];
        page[0..4].copy_from_slice(id.as_bytes());
        page[4] = RECORD_VERSION;
        page[5] = 0;
        LittleEndian::write_u16(&mut page[6..8], data.len() as u16);
        LittleEndian::write_u32(&mut page[8..12], PAGE_CRC.checksum(data));
        page[HEADER_SIZE..HEADER_SIZE + data.len()].copy_from_slice(data);

        self.flash
            .write(address, &page[..HEADER_SIZE + data.len()])
            .map_err(|_| StoreError::Device("flash write failed"))?;
        log::debug!("Wrote record {} ({} bytes) at {:#x}", id, data.len(), address);
        Ok(())
    }

    fn read_record(&mut self, id: RecordId, buffer: &mut [u8]) -> Result<usize, StoreError> {
        let address = self.page_address(id)?;

        let mut header = [0_u8; HEADER_SIZE];
        self.flash
            .read(address, &mut header)
            .map_err(|_| StoreError::Device("flash read failed"))?;
        if header[0..4] != *id.as_bytes() {
            // Erased or never written
            return Err(StoreError::NotFound);
        }
        if header[4] != RECORD_VERSION {
            return Err(StoreError::Corrupt);
        }
        let length = LittleEndian::read_u16(&header[6..8]) as usize;
        if length > MAX_RECORD_SIZE {
            return Err(StoreError::Corrupt);
        }
        if buffer.len() < length {
            return Err(StoreError::BufferTooSmall {
                size: buffer.len(),
                needed: length,
            });
        }

        self.flash
            .read(address + HEADER_SIZE as u32, &mut buffer[..length])
            .map_err(|_| StoreError::Device("flash read failed"))?;
        if PAGE_CRC.checksum(&buffer[..length]) != LittleEndian::read_u32(&header[8..12]) {
            return Err(StoreError::Corrupt);
        }
        Ok(length)
    }
}
