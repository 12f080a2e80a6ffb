//! # Single-Record Probe
//!
//! Opens a file, reads its header and first record, and decodes the fields a
//! [`Config`] asks for. Used by the `vcfbuf` binary.

use std::fmt;

use tracing::{debug, info_span};

use crate::accessor::{self, Outcome};
use crate::config::Config;
use crate::error::Result;
use crate::hts::{Header, Record, VcfFile};
use crate::missing::{is_genotype_missing, is_int32_vector_end, is_ref_missing};
use crate::utils::workspace::Workspace;

/// Where a tag lives in the record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Info,
    Format,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Info => "INFO",
            FieldKind::Format => "FORMAT",
        }
    }
}

/// Decoded field contents
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Ints(Vec<i32>),
    Floats(Vec<f32>),
    Text(String),
    /// FORMAT strings, one per sample
    SampleTexts(Vec<String>),
    /// No type produced values; carries the last outcome
    Unavailable(Outcome),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldReport {
    pub kind: FieldKind,
    pub tag: String,
    pub value: FieldValue,
}

/// Allele-level summary of FORMAT/GT
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenotypeSummary {
    pub samples: usize,
    pub called: usize,
    pub missing: usize,
}

impl GenotypeSummary {
    /// Count called and missing alleles, skipping vector-end padding
    pub fn from_encoded(samples: usize, values: &[i32]) -> Self {
        let mut summary = Self {
            samples,
            ..Self::default()
        };
        for &v in values.iter().filter(|&&v| !is_int32_vector_end(v)) {
            if is_genotype_missing(v) {
                summary.missing += 1;
            } else {
                summary.called += 1;
            }
        }
        summary
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProbeReport {
    /// 1-based position of the record, `None` for a file without records
    pub position: Option<i64>,
    pub ref_missing: bool,
    pub fields: Vec<FieldReport>,
    pub genotypes: Option<std::result::Result<GenotypeSummary, Outcome>>,
}

/// Decode one tag trying int32, then float, then string.
///
/// Only a type mismatch moves on to the next type; any other outcome is final.
fn decode_field(
    header: &Header,
    record: &mut Record,
    workspace: &mut Workspace,
    kind: FieldKind,
    tag: &str,
) -> Result<FieldValue> {
    let ints = workspace.ints(tag)?;
    let outcome = match kind {
        FieldKind::Info => accessor::get_info_int32(header, record, tag, ints)?,
        FieldKind::Format => accessor::get_format_int32(header, record, tag, ints)?,
    };
    match outcome {
        Outcome::Decoded(_) => return Ok(FieldValue::Ints(ints.as_slice().to_vec())),
        Outcome::TypeMismatch => {}
        other => return Ok(FieldValue::Unavailable(other)),
    }

    let floats = workspace.floats(tag)?;
    let outcome = match kind {
        FieldKind::Info => accessor::get_info_float(header, record, tag, floats)?,
        FieldKind::Format => accessor::get_format_float(header, record, tag, floats)?,
    };
    match outcome {
        Outcome::Decoded(_) => return Ok(FieldValue::Floats(floats.as_slice().to_vec())),
        Outcome::TypeMismatch => {}
        other => return Ok(FieldValue::Unavailable(other)),
    }

    let text = workspace.strings(tag)?;
    let outcome = match kind {
        FieldKind::Info => accessor::get_info_string(header, record, tag, text)?,
        FieldKind::Format => accessor::get_format_string(header, record, tag, text)?,
    };
    let lossy = |bytes: &[u8]| String::from_utf8_lossy(bytes).into_owned();
    Ok(match (outcome, kind) {
        (Outcome::Decoded(_), FieldKind::Info) => FieldValue::Text(lossy(text.as_bytes())),
        (Outcome::Decoded(_), FieldKind::Format) => FieldValue::SampleTexts(
            accessor::split_format_strings(text.as_slice(), header.sample_count())
                .into_iter()
                .map(lossy)
                .collect(),
        ),
        (other, _) => FieldValue::Unavailable(other),
    })
}

/// Probe the first record of `config.vcf`
pub fn probe(config: &Config) -> Result<ProbeReport> {
    let _span = info_span!("probe", path = %config.vcf.display()).entered();

    let mut file = VcfFile::open(&config.vcf)?;
    let header = Header::read(&mut file)?;
    let mut record = Record::new()?;

    if !record.read(&mut file, &header)? {
        debug!("file has no records");
        return Ok(ProbeReport {
            position: None,
            ref_missing: true,
            fields: Vec::new(),
            genotypes: None,
        });
    }

    let mut workspace = Workspace::new(config.initial_capacity);
    let mut fields = Vec::with_capacity(config.info.len() + config.format.len());

    let requested = config
        .info
        .iter()
        .map(|t| (FieldKind::Info, t))
        .chain(config.format.iter().map(|t| (FieldKind::Format, t)));
    for (kind, tag) in requested {
        let value = decode_field(&header, &mut record, &mut workspace, kind, tag)?;
        fields.push(FieldReport {
            kind,
            tag: tag.clone(),
            value,
        });
    }

    let genotypes = if config.genotypes {
        let buf = workspace.genotypes()?;
        Some(match accessor::get_genotypes(&header, &mut record, buf)? {
            Outcome::Decoded(_) => Ok(GenotypeSummary::from_encoded(
                header.sample_count(),
                buf.as_slice(),
            )),
            other => Err(other),
        })
    } else {
        None
    };

    debug!(buffers = workspace.buffer_count(), "probe complete");

    Ok(ProbeReport {
        position: Some(record.position()),
        ref_missing: is_ref_missing(&mut record),
        fields,
        genotypes,
    })
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Ints(v) => write!(f, "{:?}", v),
            FieldValue::Floats(v) => write!(f, "{:?}", v),
            FieldValue::Text(s) => write!(f, "{:?}", s),
            FieldValue::SampleTexts(v) => write!(f, "{:?}", v),
            FieldValue::Unavailable(outcome) => write!(f, "unavailable ({:?})", outcome),
        }
    }
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(pos) = self.position else {
            return writeln!(f, "no records");
        };
        writeln!(f, "pos={} ref_missing={}", pos, self.ref_missing)?;
        for field in &self.fields {
            writeln!(f, "{}/{}\t{}", field.kind.as_str(), field.tag, field.value)?;
        }
        match &self.genotypes {
            Some(Ok(gt)) => writeln!(
                f,
                "FORMAT/GT\tsamples={} called={} missing={}",
                gt.samples, gt.called, gt.missing
            ),
            Some(Err(outcome)) => writeln!(f, "FORMAT/GT\tunavailable ({:?})", outcome),
            None => Ok(()),
        }
    }
}
