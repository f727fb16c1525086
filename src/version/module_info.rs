//! Java module descriptor version reader
//!
//! Decodes just enough of a `module-info.class` file to reach the
//! `Module` attribute and return its declared version: magic header,
//! constant pool (only utf8 entries are kept, everything else is skipped
//! by size), and the class-level attribute table.

use std::collections::HashMap;

use crate::version::error::ModuleInfoError;

const CLASS_MAGIC: u32 = 0xCAFE_BABE;

/// Reads the declared module version from `module-info.class` bytes
pub fn module_version(data: &[u8]) -> Result<String, ModuleInfoError> {
    let mut reader = Reader::new(data);
    if reader.u32()? != CLASS_MAGIC {
        return Err(ModuleInfoError::BadMagic);
    }
    // minor, major
    reader.skip(4)?;

    let utf8 = read_constant_pool(&mut reader)?;

    // access_flags, this_class, super_class
    reader.skip(6)?;
    let interface_count = reader.u16()?;
    reader.skip(2 * interface_count as usize)?;
    skip_members(&mut reader)?; // fields
    skip_members(&mut reader)?; // methods

    let attribute_count = reader.u16()?;
    for _ in 0..attribute_count {
        let name_index = reader.u16()?;
        let length = reader.u32()? as usize;
        if utf8.get(&name_index).is_some_and(|name| name == "Module") {
            // module_name_index, module_flags
            reader.skip(4)?;
            let version_index = reader.u16()?;
            if version_index == 0 {
                return Err(ModuleInfoError::NoVersion);
            }
            return utf8
                .get(&version_index)
                .cloned()
                .ok_or(ModuleInfoError::BadConstantIndex(version_index));
        }
        reader.skip(length)?;
    }

    Err(ModuleInfoError::NoModuleAttribute)
}

/// Collects utf8 constants by pool index, skipping all other entry kinds
fn read_constant_pool(
    reader: &mut Reader<'_>,
) -> Result<HashMap<u16, String>, ModuleInfoError> {
    let count = reader.u16()?;
    let mut utf8 = HashMap::new();
    let mut index = 1;
    while index < count {
        let tag = reader.u8()?;
        match tag {
            // CONSTANT_Utf8
            1 => {
                let length = reader.u16()? as usize;
                let bytes = reader.bytes(length)?;
                utf8.insert(index, String::from_utf8_lossy(bytes).into_owned());
            }
            // CONSTANT_Integer, CONSTANT_Float
            3 | 4 => reader.skip(4)?,
            // CONSTANT_Long, CONSTANT_Double occupy two pool slots
            5 | 6 => {
                reader.skip(8)?;
                index += 1;
            }
            // CONSTANT_Class, CONSTANT_String, CONSTANT_MethodType,
            // CONSTANT_Module, CONSTANT_Package
            7 | 8 | 16 | 19 | 20 => reader.skip(2)?,
            // CONSTANT_MethodHandle
            15 => reader.skip(3)?,
            // field/method/interface refs, CONSTANT_NameAndType,
            // CONSTANT_Dynamic, CONSTANT_InvokeDynamic
            9 | 10 | 11 | 12 | 17 | 18 => reader.skip(4)?,
            other => return Err(ModuleInfoError::UnsupportedConstant(other)),
        }
        index += 1;
    }
    Ok(utf8)
}

/// Skips a field or method table including nested attributes
fn skip_members(reader: &mut Reader<'_>) -> Result<(), ModuleInfoError> {
    let count = reader.u16()?;
    for _ in 0..count {
        // access_flags, name_index, descriptor_index
        reader.skip(6)?;
        let attribute_count = reader.u16()?;
        for _ in 0..attribute_count {
            reader.skip(2)?;
            let length = reader.u32()? as usize;
            reader.skip(length)?;
        }
    }
    Ok(())
}

/// Bounds-checked big-endian cursor over the class file bytes
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn bytes(&mut self, n: usize) -> Result<&'a [u8], ModuleInfoError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or(ModuleInfoError::Truncated)?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn skip(&mut self, n: usize) -> Result<(), ModuleInfoError> {
        self.bytes(n).map(|_| ())
    }

    fn u8(&mut self) -> Result<u8, ModuleInfoError> {
        Ok(self.bytes(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, ModuleInfoError> {
        let bytes = self.bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn u32(&mut self) -> Result<u32, ModuleInfoError> {
        let bytes = self.bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a minimal module-info.class declaring the given utf8
    /// constants and one Module attribute
    fn class_file(constants: &[&str], version_index: u16) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&CLASS_MAGIC.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes()); // minor
        out.extend_from_slice(&65u16.to_be_bytes()); // major

        out.extend_from_slice(&(constants.len() as u16 + 1).to_be_bytes());
        for constant in constants {
            out.push(1); // CONSTANT_Utf8
            out.extend_from_slice(&(constant.len() as u16).to_be_bytes());
            out.extend_from_slice(constant.as_bytes());
        }

        out.extend_from_slice(&0x8000u16.to_be_bytes()); // ACC_MODULE
        out.extend_from_slice(&0u16.to_be_bytes()); // this_class
        out.extend_from_slice(&0u16.to_be_bytes()); // super_class
        out.extend_from_slice(&0u16.to_be_bytes()); // interfaces
        out.extend_from_slice(&0u16.to_be_bytes()); // fields
        out.extend_from_slice(&0u16.to_be_bytes()); // methods

        out.extend_from_slice(&1u16.to_be_bytes()); // one attribute
        out.extend_from_slice(&1u16.to_be_bytes()); // name index -> "Module"
        out.extend_from_slice(&6u32.to_be_bytes()); // attribute length
        out.extend_from_slice(&0u16.to_be_bytes()); // module_name_index
        out.extend_from_slice(&0u16.to_be_bytes()); // module_flags
        out.extend_from_slice(&version_index.to_be_bytes());
        out
    }

    #[test]
    fn reads_declared_module_version() {
        let data = class_file(&["Module", "2.0.1"], 2);
        assert_eq!(module_version(&data).unwrap(), "2.0.1");
    }

    #[test]
    fn missing_version_index_is_an_error() {
        let data = class_file(&["Module"], 0);
        assert!(matches!(
            module_version(&data),
            Err(ModuleInfoError::NoVersion)
        ));
    }

    #[test]
    fn class_without_module_attribute_is_an_error() {
        let mut data = class_file(&["Code", "2.0.1"], 2);
        // attribute name index 1 now resolves to "Code", so the Module
        // attribute is never found and its body is skipped by length
        data.truncate(data.len() - 6);
        let len_pos = data.len() - 4;
        data[len_pos..].copy_from_slice(&0u32.to_be_bytes());
        assert!(matches!(
            module_version(&data),
            Err(ModuleInfoError::NoModuleAttribute)
        ));
    }

    #[test]
    fn bad_magic_is_rejected() {
        assert!(matches!(
            module_version(&[0, 1, 2, 3, 4, 5, 6, 7]),
            Err(ModuleInfoError::BadMagic)
        ));
    }

    #[test]
    fn truncated_input_is_rejected() {
        let mut data = class_file(&["Module", "2.0.1"], 2);
        data.truncate(data.len() - 3);
        assert!(matches!(
            module_version(&data),
            Err(ModuleInfoError::Truncated)
        ));
    }
}
