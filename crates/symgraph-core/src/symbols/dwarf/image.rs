//! Object file parsing and DWARF section loading.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gimli::{Dwarf, EndianArcSlice, RunTimeEndian, SectionId};
use object::{Object, ObjectSection};
use once_cell::sync::OnceCell;

use super::{map_dwarf_error, OwnedDwarf, OwnedReader};
use crate::error::{Result, SymgraphError};

/// Sections the loader reads, with their ELF and Mach-O spellings.
const DWARF_SECTIONS: &[(&str, &[&str])] = &[
    (".debug_abbrev", &[".debug_abbrev", "__debug_abbrev"]),
    (".debug_addr", &[".debug_addr", "__debug_addr"]),
    (".debug_info", &[".debug_info", "__debug_info"]),
    (".debug_line", &[".debug_line", "__debug_line"]),
    (".debug_line_str", &[".debug_line_str", "__debug_line_str"]),
    (".debug_ranges", &[".debug_ranges", "__debug_ranges"]),
    (".debug_rnglists", &[".debug_rnglists", "__debug_rnglists"]),
    (".debug_str", &[".debug_str", "__debug_str"]),
    (".debug_str_offsets", &[".debug_str_offsets", "__debug_str_offsets"]),
    (".debug_types", &[".debug_types", "__debug_types"]),
    (".debug_loc", &[".debug_loc", "__debug_loc"]),
    (".debug_loclists", &[".debug_loclists", "__debug_loclists"]),
];

fn load_section_bytes(path: &Path, file: &object::File<'_>, names: &[&str]) -> Result<Arc<[u8]>>
{
    for name in names {
        if let Some(section) = file.section_by_name(name) {
            let data = section.uncompressed_data().map_err(|err| SymgraphError::ObjectParse {
                path: path.display().to_string(),
                message: format!("failed to read {name}: {err}"),
            })?;
            return Ok(match data {
                Cow::Borrowed(bytes) => Arc::<[u8]>::from(bytes.to_vec()),
                Cow::Owned(vec) => vec.into(),
            });
        }
    }

    Ok(Arc::<[u8]>::from(Vec::new()))
}

/// The debug sections of one object file.
pub(crate) struct ObjectImage
{
    path: PathBuf,
    endian: RunTimeEndian,
    debug_sections: HashMap<&'static str, Arc<[u8]>>,
    dwarf_cache: OnceCell<OwnedDwarf>,
}

impl ObjectImage
{
    /// Read `path` and copy out its DWARF sections.
    ///
    /// ## Errors
    ///
    /// - `SourceUnavailable` if the file can't be read or carries no
    ///   `.debug_info`
    /// - `ObjectParse` if it isn't an object file
    pub(crate) fn open(path: &Path) -> Result<Self>
    {
        let bytes =
            fs::read(path).map_err(|err| SymgraphError::SourceUnavailable(format!("{}: {err}", path.display())))?;
        let data = Arc::<[u8]>::from(bytes);
        let file = object::File::parse(&*data).map_err(|err| SymgraphError::ObjectParse {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;

        let endian = if file.is_little_endian() {
            RunTimeEndian::Little
        } else {
            RunTimeEndian::Big
        };

        let mut sections = HashMap::new();
        for (canonical, aliases) in DWARF_SECTIONS {
            let data = load_section_bytes(path, &file, aliases)?;
            sections.insert(*canonical, data);
        }

        let has_debug_info = sections.get(".debug_info").is_some_and(|data| !data.is_empty());
        if !has_debug_info {
            return Err(SymgraphError::SourceUnavailable(format!(
                "{} has no DWARF debug information",
                path.display()
            )));
        }

        tracing::debug!(
            path = %path.display(),
            format = ?file.format(),
            little_endian = file.is_little_endian(),
            "opened object file"
        );

        Ok(Self {
            path: path.to_path_buf(),
            endian,
            debug_sections: sections,
            dwarf_cache: OnceCell::new(),
        })
    }

    pub(crate) fn path(&self) -> &Path
    {
        &self.path
    }

    pub(crate) fn dwarf(&self) -> Result<&OwnedDwarf>
    {
        self.dwarf_cache.get_or_try_init(|| {
            Dwarf::load(|section| Ok::<_, gimli::Error>(self.section_reader(section)))
                .map_err(|err| map_dwarf_error("loading DWARF sections", err))
        })
    }

    fn section_reader(&self, id: SectionId) -> OwnedReader
    {
        let key = match id {
            SectionId::DebugAbbrev => ".debug_abbrev",
            SectionId::DebugAddr => ".debug_addr",
            SectionId::DebugInfo => ".debug_info",
            SectionId::DebugLine => ".debug_line",
            SectionId::DebugLineStr => ".debug_line_str",
            SectionId::DebugRanges => ".debug_ranges",
            SectionId::DebugRngLists => ".debug_rnglists",
            SectionId::DebugStr => ".debug_str",
            SectionId::DebugStrOffsets => ".debug_str_offsets",
            SectionId::DebugTypes => ".debug_types",
            SectionId::DebugLoc => ".debug_loc",
            SectionId::DebugLocLists => ".debug_loclists",
            _ => "",
        };

        let data = self
            .debug_sections
            .get(key)
            .cloned()
            .unwrap_or_else(|| Arc::<[u8]>::from(Vec::new()));
        EndianArcSlice::new(data, self.endian)
    }
}
