//! VISIM parameter file reading and writing.
//!
//! The parameter file is a positional grammar: after a banner and the
//! `START OF PARAMETERS` line, every record sits on a fixed line and every
//! field at a fixed token position, with free comment text allowed after the
//! tokens. Decoding runs in three phases:
//!
//! 1. the scalar header records, up to and including `nst, c0`
//! 2. exactly `nst` two-line variogram structure records
//! 3. the tail extrapolation trailer
//!
//! Lines the engine reads but this library does not model (DSSIM controls,
//! volume neighbourhood, random path, data assignment, octant search) are
//! still consumed line by line so later fields stay aligned, and are written
//! back as fixed literals.

use crate::error::{FileFormat, Result, VisimError};
use crate::models::{
    AxisGeometry, DataColumns, ParameterSet, SearchEllipsoid, TailExtrapolation, TailOption,
    VariogramStructure,
};
use crate::numeric::format_real;
use crate::scanner::LineScanner;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Marker separating the banner from the parameters
pub const PARAMETER_MARKER: &str = "START OF PARAMETERS";

const BANNER: [&str; 3] = [
    "                  Parameters for VISIM",
    "                  ********************",
    "",
];

/// Lines per variogram structure record
const STRUCTURE_LINES: usize = 2;

/// Lines in the tail extrapolation trailer
const TRAILER_LINES: usize = 3;

/// DSSIM control lines between the histogram columns and the grid
const DSSIM_LINES: [(&str, &str); 3] = [
    ("-3.5 3.5 100", "min_Gmean,max_Gmean,n_Gmean"),
    ("0 2 100", "min_Gvar,max_Gvar,n_Gvar"),
    ("170 0", "nQ (number of quantiles)"),
];

/// Search control lines between `nodmax` and the search radii
const SEARCH_CONTROL_LINES: [(&str, &str); 4] = [
    ("0 8 0.001", "Volume Neighborhood"),
    ("1", "Random Path (1=independent)"),
    ("1", "assign data to nodes (1=yes)"),
    ("0", "maximum data per octant"),
];

/// Decode the text of a parameter file
pub fn decode_parameters(text: &str) -> Result<ParameterSet> {
    let mut scanner = LineScanner::new(text, FileFormat::Parameter);
    scanner.seek_past_marker(PARAMETER_MARKER)?;

    let (mut params, nst) = read_header(&mut scanner)?;
    params.variogram = read_structures(&mut scanner, nst)?;
    params.tails = read_trailer(&mut scanner)?;

    debug!(
        "Decoded parameter file: grid {}x{}x{}, nsim={}, nst={}",
        params.grid_x.count,
        params.grid_y.count,
        params.grid_z.count,
        params.realizations,
        params.nst()
    );

    Ok(params)
}

/// Encode a parameter set in the engine's line order
///
/// File names occupy the first token of their line and the rest of the line
/// is comment text, so a file name that is empty or contains whitespace could
/// not be read back. Such a set is rejected with
/// [`VisimError::UnwritableField`] before anything is encoded.
pub fn encode_parameters(params: &ParameterSet) -> Result<String> {
    let data_file = path_token("datafl", &params.data_file)?;
    let volume_geometry_file = path_token("volgeomfl", &params.volume_geometry_file)?;
    let volume_summary_file = path_token("volsumfl", &params.volume_summary_file)?;
    let output_file = path_token("outfl", &params.output_file)?;
    let reference_histogram_file = path_token("refhist", &params.reference_histogram_file)?;

    let mut out = String::new();
    for banner_line in BANNER {
        out.push_str(banner_line);
        out.push('\n');
    }
    out.push_str("START OF PARAMETERS:\n");

    let columns = &params.data_columns;
    let (tmin, tmax) = params.trimming_limits;
    let debug_levels: Vec<String> = params.debug_levels.iter().map(i32::to_string).collect();

    record(
        &mut out,
        params.conditioning.to_string(),
        "conditional simulation (0=no,1=p+v,2=p,3=v)",
    );
    record(&mut out, data_file.to_string(), "file with conditioning data");
    record(
        &mut out,
        format!("{} {} {} {}", columns.x, columns.y, columns.z, columns.value),
        "columns for X,Y,Z,val",
    );
    record(&mut out, volume_geometry_file.to_string(), "Geometry of volume");
    record(&mut out, volume_summary_file.to_string(), "Summary of volgeom.eas");
    record(&mut out, reals(&[tmin, tmax]), "trimming limits");
    record(&mut out, debug_levels.join(" "), "debugging level");
    record(&mut out, output_file.to_string(), "file for output");
    record(&mut out, params.realizations.to_string(), "number of realizations");
    record(
        &mut out,
        params.ccdf_type.to_string(),
        "ccdf type: 0=Gaussian, 1=DSSIM",
    );
    record(&mut out, reference_histogram_file.to_string(), "reference histogram");
    record(
        &mut out,
        format!("{} {}", params.histogram_columns.0, params.histogram_columns.1),
        "columns for variable and weights",
    );
    for (values, comment) in DSSIM_LINES {
        record(&mut out, values.to_string(), comment);
    }
    for (axis, comment) in [
        (&params.grid_x, "nx,xmn,xsiz"),
        (&params.grid_y, "ny,ymn,ysiz"),
        (&params.grid_z, "nz,zmn,zsiz"),
    ] {
        record(
            &mut out,
            format!("{} {}", axis.count, reals(&[axis.origin, axis.cell_size])),
            comment,
        );
    }
    record(&mut out, params.seed.to_string(), "random number seed");
    record(
        &mut out,
        format!("{} {}", params.kriging_data.0, params.kriging_data.1),
        "min and max data for kriging",
    );
    record(
        &mut out,
        params.max_simulated_nodes.to_string(),
        "max previously simulated nodes",
    );
    for (values, comment) in SEARCH_CONTROL_LINES {
        record(&mut out, values.to_string(), comment);
    }
    record(&mut out, reals(&params.search.radii), "maximum search radii");
    record(&mut out, reals(&params.search.angles), "angles for search ellipsoid");
    record(
        &mut out,
        reals(&[params.global_mean, params.global_variance]),
        "global mean and variance",
    );
    record(
        &mut out,
        format!("{} {}", params.nst(), format_real(params.nugget)),
        "nst, nugget effect",
    );

    for structure in &params.variogram {
        record(
            &mut out,
            format!(
                "{} {} {}",
                structure.model_type,
                format_real(structure.contribution),
                reals(&structure.angles)
            ),
            "it,cc,ang1,ang2,ang3",
        );
        record(&mut out, reals(&structure.ranges), "a_hmax, a_hmin, a_vert");
    }

    let tails = &params.tails;
    record(&mut out, reals(&[tails.zmin, tails.zmax]), "zmin,zmax (tail)");
    record(
        &mut out,
        format!("{} {}", tails.lower.option, format_real(tails.lower.parameter)),
        "lower tail option, parameter",
    );
    record(
        &mut out,
        format!("{} {}", tails.upper.option, format_real(tails.upper.parameter)),
        "upper tail option, parameter",
    );

    debug!("Encoded parameter file with nst={}", params.nst());
    Ok(out)
}

fn path_token<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() || value.contains(char::is_whitespace) {
        return Err(VisimError::UnwritableField {
            format: FileFormat::Parameter,
            field,
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// Read and decode a parameter file from disk
pub fn read_parameter_file(path: &Path) -> Result<ParameterSet> {
    let text = fs::read_to_string(path)?;
    decode_parameters(&text)
}

/// Encode and write a parameter file to disk
pub fn write_parameter_file(path: &Path, params: &ParameterSet) -> Result<()> {
    fs::write(path, encode_parameters(params)?)?;
    debug!("Wrote parameter file {}", path.display());
    Ok(())
}

/// Phase one: every scalar record up to `nst, c0`. Returns the declared `nst`.
fn read_header(scanner: &mut LineScanner<'_>) -> Result<(ParameterSet, usize)> {
    let conditioning = scanner.next_record("icond", 1)?.integer(0)?;
    let data_file = scanner.next_record("datafl", 1)?.text(0).to_string();

    let record = scanner.next_record("icolx,icoly,icolz,icolvr", 4)?;
    let data_columns = DataColumns {
        x: record.integer(0)?,
        y: record.integer(1)?,
        z: record.integer(2)?,
        value: record.integer(3)?,
    };

    let volume_geometry_file = scanner.next_record("volgeomfl", 1)?.text(0).to_string();
    let volume_summary_file = scanner.next_record("volsumfl", 1)?.text(0).to_string();

    let [tmin, tmax] = scanner.next_record("tmin,tmax", 2)?.reals()?;

    let record = scanner.next_record("debugging level", 7)?;
    let mut debug_levels = [0; 7];
    for (index, level) in debug_levels.iter_mut().enumerate() {
        *level = record.integer(index)?;
    }

    let output_file = scanner.next_record("outfl", 1)?.text(0).to_string();
    let realizations = scanner.next_record("nsim", 1)?.integer(0)?;
    let ccdf_type = scanner.next_record("idrawopt", 1)?.integer(0)?;
    let reference_histogram_file = scanner.next_record("refhist", 1)?.text(0).to_string();

    let record = scanner.next_record("ibt,ibtw", 2)?;
    let histogram_columns = (record.integer(0)?, record.integer(1)?);

    scanner.skip(DSSIM_LINES.len(), "DSSIM parameters")?;

    let grid_x = read_axis(scanner, "nx,xmn,xsiz")?;
    let grid_y = read_axis(scanner, "ny,ymn,ysiz")?;
    let grid_z = read_axis(scanner, "nz,zmn,zsiz")?;

    let seed = scanner.next_record("seed", 1)?.integer(0)?;

    let record = scanner.next_record("ndmin,ndmax", 2)?;
    let kriging_data = (record.integer(0)?, record.integer(1)?);
    let max_simulated_nodes = scanner.next_record("nodmax", 1)?.integer(0)?;

    scanner.skip(SEARCH_CONTROL_LINES.len(), "search control")?;

    let radii = scanner.next_record("radius,radius1,radius2", 3)?.reals()?;
    let angles = scanner.next_record("sang1,sang2,sang3", 3)?.reals()?;
    let [global_mean, global_variance] = scanner.next_record("gmean,gvar", 2)?.reals()?;

    let record = scanner.next_record("nst,c0", 2)?;
    let nst: usize = record.integer(0)?;
    let nugget = record.real(1)?;

    let params = ParameterSet {
        conditioning,
        data_file,
        data_columns,
        volume_geometry_file,
        volume_summary_file,
        trimming_limits: (tmin, tmax),
        debug_levels,
        output_file,
        realizations,
        ccdf_type,
        reference_histogram_file,
        histogram_columns,
        grid_x,
        grid_y,
        grid_z,
        seed,
        kriging_data,
        max_simulated_nodes,
        search: SearchEllipsoid { radii, angles },
        global_mean,
        global_variance,
        nugget,
        variogram: Vec::new(),
        tails: ParameterSet::default().tails,
    };

    Ok((params, nst))
}

/// Phase two: exactly `nst` structure records of two lines each.
///
/// Fewer than `2 * nst` content lines left is always a structure shortfall.
/// With room for the structures but not for the trailer as well, the block
/// may be short a structure (the trailer then fails to parse as one) or the
/// trailer may be short a line; a structure that fails to parse in that case
/// is reported as a shortfall, and a trailer that runs out is left to phase
/// three.
fn read_structures(scanner: &mut LineScanner<'_>, nst: usize) -> Result<Vec<VariogramStructure>> {
    let available = scanner.remaining_content_lines();
    let structure_lines = nst.saturating_mul(STRUCTURE_LINES);
    let input_end = scanner.next_line_number() + available;
    let format = scanner.format();
    let shortfall = |found: usize| VisimError::StructureCountMismatch {
        format,
        declared: nst,
        found,
        line: input_end,
    };

    if available < structure_lines {
        return Err(shortfall(available / STRUCTURE_LINES));
    }
    let no_room_for_trailer = available < structure_lines.saturating_add(TRAILER_LINES);

    let mut structures = Vec::with_capacity(nst);
    for _ in 0..nst {
        match read_structure(scanner) {
            Ok(structure) => structures.push(structure),
            Err(e) if no_room_for_trailer && e.is_format_error() => {
                return Err(shortfall(structures.len()));
            }
            Err(e) => return Err(e),
        }
    }

    Ok(structures)
}

fn read_structure(scanner: &mut LineScanner<'_>) -> Result<VariogramStructure> {
    let model = scanner.next_record("it,cc,ang1,ang2,ang3", 5)?;
    let ranges = scanner.next_record("a_hmax,a_hmin,a_vert", 3)?.reals()?;

    Ok(VariogramStructure {
        model_type: model.integer(0)?,
        contribution: model.real(1)?,
        angles: [model.real(2)?, model.real(3)?, model.real(4)?],
        ranges,
    })
}

/// Phase three: tail extrapolation
fn read_trailer(scanner: &mut LineScanner<'_>) -> Result<TailExtrapolation> {
    let [zmin, zmax] = scanner.next_record("zmin,zmax", 2)?.reals()?;
    let lower = read_tail(scanner, "ltail,ltpar")?;
    let upper = read_tail(scanner, "utail,utpar")?;

    Ok(TailExtrapolation {
        zmin,
        zmax,
        lower,
        upper,
    })
}

fn read_axis(scanner: &mut LineScanner<'_>, field: &'static str) -> Result<AxisGeometry> {
    let record = scanner.next_record(field, 3)?;
    Ok(AxisGeometry {
        count: record.integer(0)?,
        origin: record.real(1)?,
        cell_size: record.real(2)?,
    })
}

fn read_tail(scanner: &mut LineScanner<'_>, field: &'static str) -> Result<TailOption> {
    let record = scanner.next_record(field, 2)?;
    Ok(TailOption {
        option: record.integer(0)?,
        parameter: record.real(1)?,
    })
}

fn reals(values: &[f64]) -> String {
    values
        .iter()
        .map(|&v| format_real(v))
        .collect::<Vec<_>>()
        .join(" ")
}

fn record(out: &mut String, values: String, comment: &str) {
    // Writing to a String cannot fail
    let _ = writeln!(out, "{:<30} - {}", values, comment);
}

#[cfg(test)]
mod tests;
