//! Core data structures exchanged with the VISIM engine.
//!
//! Defines the parameter record, GEO-EAS datasets and the decoded
//! simulation/estimation outputs used throughout the library.

use crate::error::{Result, VisimError};
use serde::{Deserialize, Serialize};

/// Column positions (1-based, as the engine expects) of the conditioning data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataColumns {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub value: i32,
}

/// Node count, origin and cell size along one grid axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisGeometry {
    pub count: usize,
    pub origin: f64,
    pub cell_size: f64,
}

impl AxisGeometry {
    pub fn new(count: usize, origin: f64, cell_size: f64) -> Self {
        Self {
            count,
            origin,
            cell_size,
        }
    }
}

/// Search ellipsoid for neighbourhood selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchEllipsoid {
    /// Maximum horizontal, minimum horizontal and vertical radii
    pub radii: [f64; 3],
    /// Rotation angles of the ellipsoid
    pub angles: [f64; 3],
}

/// One additive component of the variogram model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariogramStructure {
    /// Model type code (`it`)
    pub model_type: i32,
    /// Contribution to the sill (`cc`)
    pub contribution: f64,
    /// Anisotropy angles (`ang1`, `ang2`, `ang3`)
    pub angles: [f64; 3],
    /// Ranges along the major, minor and vertical directions (`aa`, `aa1`, `aa2`)
    pub ranges: [f64; 3],
}

impl VariogramStructure {
    /// An isotropic structure with no rotation
    pub fn isotropic(model_type: i32, contribution: f64, range: f64) -> Self {
        Self {
            model_type,
            contribution,
            angles: [0.0; 3],
            ranges: [range; 3],
        }
    }
}

/// Option code and parameter for one tail of the distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailOption {
    pub option: i32,
    pub parameter: f64,
}

/// Tail extrapolation trailer of the parameter file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailExtrapolation {
    pub zmin: f64,
    pub zmax: f64,
    pub lower: TailOption,
    pub upper: TailOption,
}

/// Every field the engine reads from its parameter file.
///
/// The structure count written to the file is always `variogram.len()`, so the
/// two can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Conditioning mode (`icond`): 0 none, 1 point and volume, 2 point, 3 volume
    pub conditioning: i32,
    pub data_file: String,
    pub data_columns: DataColumns,
    pub volume_geometry_file: String,
    pub volume_summary_file: String,
    /// Trimming limits (`tmin`, `tmax`)
    pub trimming_limits: (f64, f64),
    pub debug_levels: [i32; 7],
    pub output_file: String,
    /// Number of realizations (`nsim`)
    pub realizations: usize,
    /// ccdf type (`idrawopt`): 0 Gaussian, 1 DSSIM
    pub ccdf_type: i32,
    pub reference_histogram_file: String,
    /// Columns for variable and weights in the reference histogram (`ibt`, `ibtw`)
    pub histogram_columns: (i32, i32),
    pub grid_x: AxisGeometry,
    pub grid_y: AxisGeometry,
    pub grid_z: AxisGeometry,
    pub seed: i64,
    /// Minimum and maximum data for kriging (`ndmin`, `ndmax`)
    pub kriging_data: (i32, i32),
    /// Maximum previously simulated nodes (`nodmax`)
    pub max_simulated_nodes: i32,
    pub search: SearchEllipsoid,
    pub global_mean: f64,
    pub global_variance: f64,
    /// Nugget effect (`c0`)
    pub nugget: f64,
    pub variogram: Vec<VariogramStructure>,
    pub tails: TailExtrapolation,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            conditioning: 0,
            data_file: "data.eas".to_string(),
            data_columns: DataColumns {
                x: 1,
                y: 2,
                z: 3,
                value: 4,
            },
            volume_geometry_file: "dummy_volgeom.eas".to_string(),
            volume_summary_file: "dummy_volsum.eas".to_string(),
            trimming_limits: (-1.0e21, 1.0e21),
            debug_levels: [0, -1, -1, -1, -1, 0, 0],
            output_file: "visim.out".to_string(),
            realizations: 1,
            ccdf_type: 0,
            reference_histogram_file: "reference.eas".to_string(),
            histogram_columns: (1, 0),
            grid_x: AxisGeometry::new(50, 0.0, 1.0),
            grid_y: AxisGeometry::new(50, 0.0, 1.0),
            grid_z: AxisGeometry::new(1, 0.0, 1.0),
            seed: 69069,
            kriging_data: (0, 12),
            max_simulated_nodes: 12,
            search: SearchEllipsoid {
                radii: [10.0; 3],
                angles: [0.0; 3],
            },
            global_mean: 0.0,
            global_variance: 1.0,
            nugget: 0.0,
            variogram: vec![VariogramStructure::isotropic(1, 1.0, 10.0)],
            tails: TailExtrapolation {
                zmin: -10.0,
                zmax: 10.0,
                lower: TailOption {
                    option: 1,
                    parameter: 1.0,
                },
                upper: TailOption {
                    option: 1,
                    parameter: 1.0,
                },
            },
        }
    }
}

impl ParameterSet {
    /// Number of variogram structures (`nst`)
    pub fn nst(&self) -> usize {
        self.variogram.len()
    }

    /// Grid extents `(nx, ny, nz)`
    pub fn grid_dims(&self) -> (usize, usize, usize) {
        (self.grid_x.count, self.grid_y.count, self.grid_z.count)
    }

    /// Total grid nodes, `None` on overflow
    pub fn node_count(&self) -> Option<usize> {
        let (nx, ny, nz) = self.grid_dims();
        nx.checked_mul(ny)?.checked_mul(nz)
    }

    /// Total sill: nugget plus every structure's contribution
    pub fn total_sill(&self) -> f64 {
        self.nugget + self.variogram.iter().map(|s| s.contribution).sum::<f64>()
    }
}

/// A GEO-EAS dataset: title, variable names and rectangular numeric rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabularDataset {
    pub title: String,
    variable_names: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl TabularDataset {
    /// Build a dataset, checking every row against the variable count
    pub fn new(
        title: impl Into<String>,
        variable_names: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let mut dataset = Self::empty(title, variable_names);
        for row in rows {
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }

    /// A header-only dataset
    pub fn empty(title: impl Into<String>, variable_names: Vec<String>) -> Self {
        Self {
            title: title.into(),
            variable_names,
            rows: Vec::new(),
        }
    }

    /// Title `Data` and variables named `var1..varN`
    pub fn with_default_names(rows: Vec<Vec<f64>>) -> Result<Self> {
        let columns = rows.first().map_or(0, Vec::len);
        let names = (1..=columns).map(|i| format!("var{}", i)).collect();
        Self::new("Data", names, rows)
    }

    /// Reshape a one-dimensional sequence into a single-column dataset
    pub fn from_column(title: impl Into<String>, name: impl Into<String>, values: &[f64]) -> Self {
        Self {
            title: title.into(),
            variable_names: vec![name.into()],
            rows: values.iter().map(|&v| vec![v]).collect(),
        }
    }

    /// Append a record; its length must equal the variable count
    pub fn push_row(&mut self, row: Vec<f64>) -> Result<()> {
        if row.len() != self.variable_names.len() {
            return Err(VisimError::dimension_mismatch(
                format!("row {} of dataset '{}'", self.rows.len() + 1, self.title),
                self.variable_names.len(),
                row.len(),
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn variable_names(&self) -> &[String] {
        &self.variable_names
    }

    pub fn variable_count(&self) -> usize {
        self.variable_names.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Copy of one column, `None` if out of range
    pub fn column(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.variable_count() {
            return None;
        }
        Some(self.rows.iter().map(|row| row[index]).collect())
    }

    /// Copy of the first column whose name matches exactly
    pub fn column_by_name(&self, name: &str) -> Option<Vec<f64>> {
        let index = self.variable_names.iter().position(|n| n == name)?;
        self.column(index)
    }

    /// Read the first four columns as x, y, z and value
    pub fn as_point_cloud(&self) -> Result<PointCloud> {
        if self.variable_count() < 4 {
            return Err(VisimError::SchemaMismatch {
                view: "point cloud (x, y, z, value)",
                required: 4,
                found: self.variable_count(),
            });
        }

        let mut cloud = PointCloud::default();
        for row in &self.rows {
            cloud.x.push(row[0]);
            cloud.y.push(row[1]);
            cloud.z.push(row[2]);
            cloud.value.push(row[3]);
        }
        Ok(cloud)
    }
}

/// Conditioning points split into coordinate and value columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub value: Vec<f64>,
}

impl PointCloud {
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// Decoded simulation output: realizations stacked one after another.
///
/// `values.len()` always equals `realizations * nx * ny * nz`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutput {
    pub title: String,
    pub realizations: usize,
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    values: Vec<f64>,
}

impl SimulationOutput {
    /// Build an output, checking the buffer length against the geometry
    pub fn new(
        title: impl Into<String>,
        realizations: usize,
        (nx, ny, nz): (usize, usize, usize),
        values: Vec<f64>,
    ) -> Result<Self> {
        let expected = nx
            .checked_mul(ny)
            .and_then(|n| n.checked_mul(nz))
            .and_then(|n| n.checked_mul(realizations))
            .ok_or_else(|| {
                VisimError::dimension_mismatch(
                    format!("{} realizations of {}x{}x{} grid", realizations, nx, ny, nz),
                    usize::MAX,
                    values.len(),
                )
            })?;

        if values.len() != expected {
            return Err(VisimError::dimension_mismatch(
                format!("{} realizations of {}x{}x{} grid", realizations, nx, ny, nz),
                expected,
                values.len(),
            ));
        }

        Ok(Self {
            title: title.into(),
            realizations,
            nx,
            ny,
            nz,
            values,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    pub fn is_single_realization(&self) -> bool {
        self.realizations == 1
    }

    /// `[nodes]` for a single realization, `[realizations, nodes]` otherwise
    pub fn shape(&self) -> Vec<usize> {
        if self.is_single_realization() {
            vec![self.node_count()]
        } else {
            vec![self.realizations, self.node_count()]
        }
    }

    /// Every value in file order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Values of realization `index`, in grid (column-major) order
    pub fn realization(&self, index: usize) -> Option<&[f64]> {
        if index >= self.realizations {
            return None;
        }
        let nodes = self.node_count();
        Some(&self.values[index * nodes..(index + 1) * nodes])
    }

    pub fn realizations(&self) -> impl Iterator<Item = &[f64]> + '_ {
        let nodes = self.node_count();
        (0..self.realizations).map(move |r| &self.values[r * nodes..(r + 1) * nodes])
    }
}

/// Decoded estimation output: kriged mean and variance per grid node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimationOutput {
    pub mean: Vec<f64>,
    pub variance: Vec<f64>,
}

impl EstimationOutput {
    pub fn node_count(&self) -> usize {
        self.mean.len()
    }

    /// Kriging standard deviation per node
    pub fn std_dev(&self) -> Vec<f64> {
        self.variance.iter().map(|v| v.sqrt()).collect()
    }
}
