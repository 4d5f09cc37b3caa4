//! A from-scratch decoder for the `compress`/ncompress Unix utility's LZW
//! file format (the `compress`/`x-compress` Content-Encoding).
//!
//! References used while porting this:
//! - LZW algorithm: <http://warp.povusers.org/EfficientLZW/part5.html>
//! - ncompress's file format: <https://github.com/vapier/ncompress/blob/main/compress.c>
//! - ncompress's bit-alignment padding quirk: <https://github.com/vapier/ncompress/issues/5>

mod dictionary;

use std::path::Path;

use ioutil::ChunkWriter;

use crate::error::{Error, Result};
use dictionary::Dictionary;

const MIN_BITS: u8 = 9;
const MAX_BITS: u8 = 16;
const MIN_DICTIONARY_ENTRIES: usize = 256;
const FLUSH_THRESHOLD: usize = 64 * 1024;

fn round_up_offset(num: usize, multiple: usize) -> usize {
    if multiple == 0 {
        return 0;
    }
    let rem = num % multiple;
    if rem == 0 {
        0
    } else {
        multiple - rem
    }
}

/// Read `count` bits (`count` <= 24) starting at bit `bit_pos` out of
/// `data`, treating every 4-byte window as a little-endian integer the
/// way the source's `BIT_SLICE` over a `CopyMemory`'d `u32` does.
fn read_code(data: &[u8], bit_pos: usize, count: u8) -> u32 {
    let byte_idx = bit_pos / 8;
    let bit_offset = bit_pos % 8;
    let mut window: u32 = 0;
    for i in 0..4usize {
        let byte = data.get(byte_idx + i).copied().unwrap_or(0) as u32;
        window |= byte << (8 * i);
    }
    let mask = (1u32 << count) - 1;
    (window >> bit_offset) & mask
}

pub fn decode(path: &Path, writer: &mut ChunkWriter) -> Result<()> {
    let data = std::fs::read(path)?;
    decode_bytes(&data, writer)
}

fn decode_bytes(data: &[u8], writer: &mut ChunkWriter) -> Result<()> {
    if data.len() < 3 || data[0] != 0x1F || data[1] != 0x9D {
        let a = data.first().copied().unwrap_or(0);
        let b = data.get(1).copied().unwrap_or(0);
        return Err(Error::InvalidLzwSignature(a, b));
    }

    let flags = data[2];
    let max_bits = flags & 0x1F;
    let block_mode = flags & 0x80 != 0;

    if max_bits < MIN_BITS || max_bits > MAX_BITS {
        return Err(Error::LzwBitsOutOfBounds(max_bits, MIN_BITS, MAX_BITS));
    }

    let initial_entries = if block_mode {
        MIN_DICTIONARY_ENTRIES + 1
    } else {
        MIN_DICTIONARY_ENTRIES
    };
    let clear_index = if block_mode {
        Some((initial_entries - 1) as u32)
    } else {
        None
    };
    let max_entries = 1usize << max_bits;

    let mut dict = Dictionary::new(initial_entries, max_entries, clear_index);
    let mut current_bit_count = MIN_BITS;
    let mut current_max_entries = 1usize << current_bit_count;
    let mut previous_bit_count = current_bit_count;
    let mut codes_found_for_bit_count: usize = 0;
    let mut previous_index: Option<u32> = None;

    let bits = &data[3..];
    let total_bits = bits.len() * 8;
    let mut bit_pos = 0usize;

    let mut out_buf: Vec<u8> = Vec::new();

    loop {
        if total_bits.saturating_sub(bit_pos) < current_bit_count as usize {
            break;
        }

        if previous_bit_count != current_bit_count {
            let padding = round_up_offset(
                codes_found_for_bit_count * previous_bit_count as usize,
                8 * previous_bit_count as usize,
            );
            bit_pos += padding;
            codes_found_for_bit_count = 0;
            previous_bit_count = current_bit_count;
            continue;
        }

        let current_index = read_code(bits, bit_pos, current_bit_count);
        bit_pos += current_bit_count as usize;
        codes_found_for_bit_count += 1;

        if current_index as usize > dict.len() {
            return Err(Error::LzwIndexOutOfBounds {
                index: current_index,
                max: dict.len(),
            });
        }

        if previous_index.is_none() {
            if current_index as usize > MIN_DICTIONARY_ENTRIES - 1 {
                return Err(Error::LzwIndexOutOfBounds {
                    index: current_index,
                    max: MIN_DICTIONARY_ENTRIES - 1,
                });
            }
            dict.expand_into(current_index, &mut out_buf);
            previous_index = Some(current_index);
            maybe_flush(&mut out_buf, writer)?;
            continue;
        }

        if block_mode && Some(current_index) == clear_index {
            dict.truncate(initial_entries);
            current_bit_count = MIN_BITS;
            current_max_entries = 1usize << current_bit_count;
            previous_index = None;
            continue;
        }

        let prev = previous_index.expect("checked above");

        let out_start = out_buf.len();
        if (current_index as usize) < dict.len() {
            let first_value = dict.first_byte(current_index);
            dict.expand_into(current_index, &mut out_buf);
            dict.push(prev, first_value);
        } else {
            // The KwKwK special case: the code refers to the entry we are
            // about to create, one past the end of the dictionary.
            let first_value = dict.first_byte(prev);
            dict.push(prev, first_value);
            let new_index = dict.len() as u32 - 1;
            dict.expand_into(new_index, &mut out_buf);
        }
        debug_assert!(out_buf.len() > out_start);

        if dict.len() >= current_max_entries && !dict.is_full() {
            current_bit_count = (current_bit_count + 1).min(max_bits);
            current_max_entries = 1usize << current_bit_count;
        }

        previous_index = Some(current_index);
        maybe_flush(&mut out_buf, writer)?;
    }

    writer.write_next(&out_buf)?;
    writer.flush()?;
    Ok(())
}

fn maybe_flush(out_buf: &mut Vec<u8>, writer: &mut ChunkWriter) -> Result<()> {
    if out_buf.len() >= FLUSH_THRESHOLD {
        writer.write_next(out_buf)?;
        out_buf.clear();
    }
    Ok(())
}
