//! Tests for the parameter file codec
//!
//! Shared fixtures live here; the tests are split by decode, encode and
//! round-trip behaviour.

mod round_trip_tests;

/// A hand-written parameter file in the layout the engine ships with:
/// banner, marker, comment text after every record and two variogram structures.
pub fn sample_parameter_text() -> String {
    r#"                  Parameters for VISIM
                  ********************

START OF PARAMETERS:
1                             - conditional simulation (0=no,1=p+v,2=p,3=v)
conditioning_data.eas         - file with conditioning data
1 2 3 4                       - columns for X,Y,Z,val
visim_volgeom.eas             - Geometry of volume
visim_volsum.eas              - Summary of volgeom.eas
-1.0e21   1.0e21              - trimming limits
0 -1 -1 -1 -1 0 0             - debugging level
conditional_estimation.out    - file for output
100                           - number of realizations
0                             - ccdf type: 0=Gaussian, 1=DSSIM
reference.eas                 - reference histogram
1    0                        - columns for variable and weights
-3.5 3.5 100                  - min_Gmean,max_Gmean,n_Gmean
0 2 100                       - min_Gvar,max_Gvar,n_Gvar
170 0                         - nQ (number of quantiles)
40   0.5   1.0                - nx,xmn,xsiz
30   0.5   2.0                - ny,ymn,ysiz
1    0.0   1.0                - nz,zmn,zsiz
69069                         - random number seed
0    16                       - min and max data for kriging
24                            - max previously simulated nodes
0 8 0.001                     - Volume Neighborhood
1                             - Random Path (1=independent)
1                             - assign data to nodes (1=yes)
0                             - maximum data per octant
20.0  15.0  5.0               - maximum search radii
30.0   0.0   0.0              - angles for search ellipsoid
5.0  4.0                      - global mean and variance
2    0.1                      - nst, nugget effect
1    2.5  30.0   0.0   0.0    - it,cc,ang1,ang2,ang3
         12.0 6.0  1.0        - a_hmax, a_hmin, a_vert
2    1.4  0.0   0.0   0.0     - it,cc,ang1,ang2,ang3
         40.0 40.0  40.0      - a_hmax, a_hmin, a_vert
-10.0   10.0                  - zmin,zmax (tail)
1       1.0                   - lower tail option, parameter
4       2.5                   - upper tail option, parameter
"#
    .to_string()
}

/// `text` with the first line starting with `target` (after indentation) replaced
pub fn replace_line(text: &str, target: &str, replacement: &str) -> String {
    let mut replaced = false;
    let lines: Vec<&str> = text
        .lines()
        .map(|line| {
            if !replaced && line.trim_start().starts_with(target) {
                replaced = true;
                replacement
            } else {
                line
            }
        })
        .collect();
    assert!(replaced, "fixture line starting with '{}' not found", target);
    lines.join("\n") + "\n"
}
