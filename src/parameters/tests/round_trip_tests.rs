//! Encode-then-decode behaviour for constructed and decoded parameter sets

use super::*;
use crate::models::{ParameterSet, VariogramStructure};
use crate::parameters::{decode_parameters, encode_parameters};

fn structures(count: usize) -> Vec<VariogramStructure> {
    (0..count)
        .map(|i| VariogramStructure {
            model_type: i as i32 + 1,
            contribution: 0.35 * (i + 1) as f64,
            angles: [15.0 * i as f64, 2.5, -7.25],
            ranges: [120.5, 60.125 / (i + 1) as f64, 3.3e-5],
        })
        .collect()
}

#[test]
fn test_constructed_sets_survive_encoding() {
    for nst in 1..=3 {
        let mut params = ParameterSet::default();
        params.variogram = structures(nst);
        params.realizations = 25;
        params.global_mean = 5.0;
        params.global_variance = 4.0;
        params.output_file = "test_output.out".to_string();
        params.grid_x.origin = 0.1;
        params.grid_z.cell_size = 0.333;
        params.seed = 123456789;
        params.trimming_limits = (-9.99e20, 2.0e30);

        let decoded = decode_parameters(&encode_parameters(&params).unwrap()).unwrap();
        assert_eq!(decoded, params, "nst={}", nst);
    }
}

#[test]
fn test_decoded_set_survives_encoding() {
    let original = decode_parameters(&sample_parameter_text()).unwrap();
    let decoded = decode_parameters(&encode_parameters(&original).unwrap()).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn test_decoded_and_constructed_render_identically() {
    let decoded = decode_parameters(&sample_parameter_text()).unwrap();
    let constructed = ParameterSet {
        variogram: vec![
            VariogramStructure {
                model_type: 1,
                contribution: 2.5,
                angles: [30.0, 0.0, 0.0],
                ranges: [12.0, 6.0, 1.0],
            },
            VariogramStructure {
                model_type: 2,
                contribution: 1.4,
                angles: [0.0; 3],
                ranges: [40.0; 3],
            },
        ],
        ..decoded.clone()
    };

    assert_eq!(
        encode_parameters(&decoded).unwrap(),
        encode_parameters(&constructed).unwrap()
    );
}

#[test]
fn test_read_modify_write() {
    let mut params = decode_parameters(&sample_parameter_text()).unwrap();
    params.realizations = 10;
    params.variogram.pop();

    let decoded = decode_parameters(&encode_parameters(&params).unwrap()).unwrap();
    assert_eq!(decoded.realizations, 10);
    assert_eq!(decoded.nst(), 1);
    assert_eq!(decoded.tails, params.tails);
}
