//! Partition definition string parser
//!
//! Parses one chip's clause of the `flash.part` configuration attribute.
//! The format follows the Linux kernel's mtdparts convention:
//!
//! ```text
//! partdef_list := <mtd-id> ':' partdef (',' partdef)*
//! partdef      := size ['@' offset] ['(' name ')'] ['ro'] ['lk']
//! size         := magnitude | '-'        ('-' = remaining chip space)
//! offset       := magnitude
//! magnitude    := decimal or 0x-hex number, optional k/m/g suffix
//! name         := any characters except ')'
//! ```
//!
//! Example: `edb7312-nor:256k(boot)ro,1m(kernel),-(root)`
//!
//! Sizes and explicit offsets are rounded up to the chip's erase
//! granularity. A partition without an explicit `@offset` starts right
//! after the previous partition's end; an explicit offset resets the
//! running cursor.

use alloc::vec::Vec;

use super::types::{PartFlags, PartitionDescriptor, MAX_PARTITIONS};
use crate::chip::ChipGeometry;
use crate::error::{Error, Result, SpecFailure};

fn fail(failure: SpecFailure) -> Error {
    Error::MalformedSpec(failure)
}

/// Round `value` up to the next multiple of `align` (a power of two)
fn align_up(value: u32, align: u32) -> Result<u32> {
    let mask = align - 1;
    value
        .checked_add(mask)
        .map(|v| v & !mask)
        .ok_or(fail(SpecFailure::MagnitudeOverflow))
}

/// Consume a magnitude token from the front of `input`
///
/// Accepts decimal or `0x`-prefixed hex, with an optional binary
/// k/m/g suffix. Returns the value and the remaining input.
fn take_magnitude(input: &str) -> Result<(u32, &str)> {
    let (radix, digits_at) = if input.starts_with("0x") || input.starts_with("0X") {
        (16, 2)
    } else {
        (10, 0)
    };

    let digits_end = input[digits_at..]
        .find(|c: char| !c.is_digit(radix))
        .map(|i| digits_at + i)
        .unwrap_or(input.len());
    if digits_end == digits_at {
        return Err(fail(SpecFailure::BadMagnitude));
    }

    let value = u32::from_str_radix(&input[digits_at..digits_end], radix)
        .map_err(|_| fail(SpecFailure::MagnitudeOverflow))?;

    let rest = &input[digits_end..];
    let shift = match rest.bytes().next() {
        Some(b'k') | Some(b'K') => Some(10),
        Some(b'm') | Some(b'M') => Some(20),
        Some(b'g') | Some(b'G') => Some(30),
        _ => None,
    };

    match shift {
        Some(shift) => {
            let value = value
                .checked_mul(1 << shift)
                .ok_or(fail(SpecFailure::MagnitudeOverflow))?;
            Ok((value, &rest[1..]))
        }
        None => Ok((value, rest)),
    }
}

/// Parse a single chip's partition clause into descriptors
///
/// `clause` must already be isolated from any `;`-joined multi-chip list.
/// Returns the partitions in file order. A clause with no definitions
/// after the `:` yields an empty list, meaning "no partitioning": the
/// registry registers the whole chip instead.
pub fn parse_partitions(
    geometry: &ChipGeometry,
    clause: &str,
) -> Result<Vec<PartitionDescriptor>> {
    let (_mtd_id, defs) = clause
        .split_once(':')
        .ok_or(fail(SpecFailure::MissingSeparator))?;

    let mut rest = defs.trim();
    if rest.is_empty() {
        return Ok(Vec::new());
    }

    let mut partitions = Vec::new();
    let mut cursor: u32 = 0;

    loop {
        if partitions.len() >= MAX_PARTITIONS {
            return Err(fail(SpecFailure::TooManyPartitions));
        }
        if cursor >= geometry.chip_size {
            return Err(fail(SpecFailure::CursorBeyondChip));
        }

        // size; '-' takes everything up to the end of the chip
        let size = if let Some(r) = rest.strip_prefix('-') {
            rest = r;
            geometry.chip_size - cursor
        } else {
            let (value, r) = take_magnitude(rest)?;
            rest = r;
            align_up(value, geometry.erase_size)?
        };

        // explicit base overrides and resets the running cursor
        let base = if let Some(r) = rest.strip_prefix('@') {
            let (value, r) = take_magnitude(r)?;
            rest = r;
            let base = align_up(value, geometry.erase_size)?;
            cursor = base;
            base
        } else {
            cursor
        };

        // optional name
        let name = if let Some(r) = rest.strip_prefix('(') {
            let end = r.find(')').ok_or(fail(SpecFailure::UnterminatedName))?;
            let name = heapless::String::try_from(&r[..end])
                .map_err(|_| fail(SpecFailure::NameTooLong))?;
            rest = &r[end + 1..];
            name
        } else {
            heapless::String::new()
        };

        // optional declared flags
        let mut flags = PartFlags::empty();
        loop {
            if let Some(r) = rest.strip_prefix("ro") {
                flags |= PartFlags::READ_ONLY;
                rest = r;
            } else if let Some(r) = rest.strip_prefix("lk") {
                flags |= PartFlags::LOCKED;
                rest = r;
            } else {
                break;
            }
        }

        if size == 0 {
            return Err(fail(SpecFailure::ZeroSize));
        }
        let end = base
            .checked_add(size)
            .ok_or(fail(SpecFailure::MagnitudeOverflow))?;
        if end > geometry.chip_size {
            return Err(fail(SpecFailure::PartitionOutOfBounds));
        }

        cursor = end;
        partitions.push(PartitionDescriptor {
            name,
            base,
            size,
            flags,
        });

        if rest.is_empty() {
            break;
        }
        rest = rest
            .strip_prefix(',')
            .ok_or(fail(SpecFailure::TrailingInput))?;
    }

    Ok(partitions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::FlashType;

    fn nor_8k() -> ChipGeometry {
        ChipGeometry::new(FlashType::Nor, 8192, 4096, 256).unwrap()
    }

    fn nor_16m() -> ChipGeometry {
        ChipGeometry::new(FlashType::Nor, 16 << 20, 64 << 10, 256).unwrap()
    }

    #[test]
    fn test_take_magnitude() {
        assert_eq!(take_magnitude("4096").unwrap(), (4096, ""));
        assert_eq!(take_magnitude("256k(boot)").unwrap(), (256 << 10, "(boot)"));
        assert_eq!(take_magnitude("1m,").unwrap(), (1 << 20, ","));
        assert_eq!(take_magnitude("1g").unwrap(), (1 << 30, ""));
        assert_eq!(take_magnitude("0x1000@0").unwrap(), (4096, "@0"));
        assert_eq!(take_magnitude("0X10k").unwrap(), (16 << 10, ""));
        assert!(take_magnitude("(boot)").is_err());
        assert!(take_magnitude("").is_err());
        // 8G overflows u32
        assert_eq!(
            take_magnitude("8g"),
            Err(Error::MalformedSpec(SpecFailure::MagnitudeOverflow))
        );
    }

    #[test]
    fn test_explicit_offsets_reset_cursor() {
        let parts = parse_partitions(&nor_8k(), "chip:1000@0(a),2000@4096(b)").unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].name.as_str(), "a");
        assert_eq!(parts[0].base, 0);
        assert_eq!(parts[0].size, 4096);
        assert_eq!(parts[1].name.as_str(), "b");
        assert_eq!(parts[1].base, 4096);
        assert_eq!(parts[1].size, 4096);
    }

    #[test]
    fn test_implicit_chaining() {
        let parts = parse_partitions(&nor_8k(), "chip:4096(a),4096(b)").unwrap();
        assert_eq!(parts[0].base, 0);
        assert_eq!(parts[0].size, 4096);
        assert_eq!(parts[1].base, 4096);
        assert_eq!(parts[1].size, 4096);
    }

    #[test]
    fn test_dash_takes_remaining_space() {
        let parts = parse_partitions(&nor_16m(), "chip:256k(boot),1m(kernel),-(root)").unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].base, (256 << 10) + (1 << 20));
        assert_eq!(parts[2].size, (16 << 20) - (256 << 10) - (1 << 20));
        let total: u32 = parts.iter().map(|p| p.size).sum();
        assert_eq!(total, 16 << 20);
    }

    #[test]
    fn test_sizes_round_up_to_erase_granularity() {
        let geometry = nor_16m();
        let parts = parse_partitions(&geometry, "chip:1(a),100k@200k(b)").unwrap();
        assert_eq!(parts[0].size, 64 << 10);
        assert_eq!(parts[1].size, 128 << 10);
        assert_eq!(parts[1].base, 256 << 10);
        for part in &parts {
            assert_eq!(part.base % geometry.erase_size, 0);
            assert_eq!(part.size % geometry.erase_size, 0);
        }
    }

    #[test]
    fn test_unnamed_and_flags() {
        let parts = parse_partitions(&nor_16m(), "chip:256kro,1mlk,-(rest)rolk").unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].name.as_str(), "");
        assert_eq!(parts[0].flags, PartFlags::READ_ONLY);
        assert_eq!(parts[1].flags, PartFlags::LOCKED);
        assert_eq!(parts[2].name.as_str(), "rest");
        assert_eq!(parts[2].flags, PartFlags::READ_ONLY | PartFlags::LOCKED);
    }

    #[test]
    fn test_missing_separator() {
        assert_eq!(
            parse_partitions(&nor_8k(), "4096(a)"),
            Err(Error::MalformedSpec(SpecFailure::MissingSeparator))
        );
    }

    #[test]
    fn test_empty_partition_list_means_no_partitioning() {
        assert!(parse_partitions(&nor_8k(), "chip:").unwrap().is_empty());
        assert!(parse_partitions(&nor_8k(), "chip:  ").unwrap().is_empty());
    }

    #[test]
    fn test_cursor_beyond_chip() {
        assert_eq!(
            parse_partitions(&nor_8k(), "chip:8192(a),4096(b)"),
            Err(Error::MalformedSpec(SpecFailure::CursorBeyondChip))
        );
    }

    #[test]
    fn test_partition_out_of_bounds() {
        assert_eq!(
            parse_partitions(&nor_8k(), "chip:8192@4096(a)"),
            Err(Error::MalformedSpec(SpecFailure::PartitionOutOfBounds))
        );
    }

    #[test]
    fn test_unterminated_name() {
        assert_eq!(
            parse_partitions(&nor_8k(), "chip:4096(a"),
            Err(Error::MalformedSpec(SpecFailure::UnterminatedName))
        );
    }

    #[test]
    fn test_name_too_long() {
        assert_eq!(
            parse_partitions(&nor_8k(), "chip:4096(a-name-longer-than-sixteen-bytes)"),
            Err(Error::MalformedSpec(SpecFailure::NameTooLong))
        );
    }

    #[test]
    fn test_name_may_contain_commas() {
        let parts = parse_partitions(&nor_8k(), "chip:4096(a,b),-(c)").unwrap();
        assert_eq!(parts[0].name.as_str(), "a,b");
        assert_eq!(parts[1].name.as_str(), "c");
    }

    #[test]
    fn test_trailing_input() {
        assert_eq!(
            parse_partitions(&nor_8k(), "chip:4096(a)x"),
            Err(Error::MalformedSpec(SpecFailure::TrailingInput))
        );
    }

    #[test]
    fn test_too_many_partitions() {
        let geometry = ChipGeometry::new(FlashType::Nor, 1 << 20, 4096, 256).unwrap();
        let mut spec = alloc::string::String::from("chip:4096");
        for _ in 0..MAX_PARTITIONS {
            spec.push_str(",4096");
        }
        assert_eq!(
            parse_partitions(&geometry, &spec),
            Err(Error::MalformedSpec(SpecFailure::TooManyPartitions))
        );
    }

    #[test]
    fn test_zero_size_rejected() {
        assert_eq!(
            parse_partitions(&nor_8k(), "chip:0(a)"),
            Err(Error::MalformedSpec(SpecFailure::ZeroSize))
        );
    }
}
