//! Graph builders for the pipeline's five products: the DN band stack, TOA
//! reflectance, and the NDVI / WDRI / MSAVI indices.
//!
//! Each builder returns a `ComputationGraph` with exactly one terminal write.
//! Expression text follows the engine's job-description templates; band
//! positions RED = 3 and NIR = 4 hold for every family because the stacks
//! are ordered that way (Landsat: 1,2,3,4,5,7; Sentinel-2: B02,B03,B04,B08).

use std::path::{Path, PathBuf};

use crate::types::SensorFamily;

use super::calibration::{CalibrationCoefficients, SolarGeometry};
use super::graph::{ComputationGraph, Node, options};

/// Stack position of the red band.
pub const RED_BAND: u32 = 3;
/// Stack position of the near-infrared band.
pub const NIR_BAND: u32 = 4;

/// Input node names for the stack job. Landsat nodes carry the raw band
/// number (n1..n5, n7); Sentinel-2 nodes are positional (n1..n4).
fn stack_input_names(family: SensorFamily) -> Vec<String> {
    match family {
        SensorFamily::S2 => (1..=family.band_numbers().len())
            .map(|i| format!("n{i}"))
            .collect(),
        _ => family
            .band_numbers()
            .iter()
            .map(|b| format!("n{b}"))
            .collect(),
    }
}

/// Output node name for the stack job: one past the highest input node.
fn stack_output_name(family: SensorFamily) -> &'static str {
    match family {
        SensorFamily::S2 => "n5",
        _ => "n8",
    }
}

/// Band stack: one integer input per band file, one unsigned-integer
/// terminal stack write.
pub fn stack_graph(family: SensorFamily, band_files: &[PathBuf], stack_img: &Path) -> ComputationGraph {
    let names = stack_input_names(family);
    debug_assert_eq!(names.len(), band_files.len());

    let mut graph = ComputationGraph::new();
    graph
        .push(Node::Setting("SET CELLSIZE MIN"))
        .push(Node::Setting("SET WINDOW INTERSECTION"))
        .push(Node::Setting("SET AOI NONE"));
    for (name, file) in names.iter().zip(band_files) {
        graph.push(Node::RasterInput {
            keyword: "INTEGER",
            name: name.clone(),
            options: options::STACK_INPUT,
            path: file.clone(),
        });
    }
    let output = stack_output_name(family);
    graph.push(Node::RasterOutput {
        keyword: "INTEGER",
        name: output.to_string(),
        disposition: "DELETE_IF_EXISTING",
        options: format!("{}{}", options::STACK_OUTPUT, family.stack_storage()),
        path: stack_img.to_path_buf(),
    });
    graph.push(Node::Assign {
        target: output.to_string(),
        expr: format!("STACKLAYERS ({})", names.join(", ")),
    });
    graph
}

/// Radiance rescale expression for one coefficient index: zero DNs stay
/// zero, everything else is gain * DN + bias.
fn radiance_expr(stack_ref: u32, gain_table: &str, bias_table: &str, k: usize) -> String {
    format!(
        "Float(EITHER 0 IF ( n1({stack_ref}) == 0 ) OR ((n1({stack_ref}) * {gain_table}[{k}]) + ({bias_table}[{k}])) OTHERWISE )"
    )
}

/// TOA reflectance expression over a radiance node: zero radiance or a zero
/// irradiance denominator yields zero, otherwise pi * L * d^2 over
/// ESUN * cos(solar zenith). Degrees convert to radians only inside COS.
fn reflectance_expr(radiance_node: &str, k: usize) -> String {
    format!(
        "Float(EITHER 0 IF ( {radiance_node} == 0 OR (ESUN_values [{k}] * (COS ( (90 - sun_elev) * (PI)/180 ) ) ) == 0  )\
OR (((PI) * {radiance_node}) * (distance POWER (2)) /  (ESUN_values [{k}] * (COS ( (90 - sun_elev) * (PI)/180 ) ) )) OTHERWISE )"
    )
}

/// TOA reflectance over the DN stack. Landsat 8 reads stack references 2..7
/// of its seven-band stack; the six-band families read references 1..6. The
/// six per-band expression pairs are independent; a single terminal
/// STACKLAYERS write joins them into one float raster.
pub fn toa_graph(
    family: SensorFamily,
    stack_img: &Path,
    toa_img: &Path,
    coefficients: &CalibrationCoefficients,
    geometry: SolarGeometry,
) -> ComputationGraph {
    // Landsat 8 metadata carries radiance rescale factors; the older
    // families carry gain/bias rescale constants. The engine tables are
    // named accordingly.
    let (gain_table, bias_table): (&'static str, &'static str) = match family {
        SensorFamily::L8 => ("rad_mult", "rad_add"),
        _ => ("g_rescale", "b_rescale"),
    };
    // First stack reference holding a reflective band.
    let ref_base: u32 = match family {
        SensorFamily::L8 => 2,
        _ => 1,
    };

    let mut graph = ComputationGraph::new();
    graph
        .push(Node::RasterInput {
            keyword: "Integer",
            name: "n1".into(),
            options: options::PLAIN_INPUT,
            path: stack_img.to_path_buf(),
        })
        .push(Node::RasterOutput {
            keyword: "Float",
            name: "n32".into(),
            disposition: "DELETE_IF_EXISTING",
            options: options::FLOAT_IGNORE_ZERO_OUTPUT.to_string(),
            path: toa_img.to_path_buf(),
        })
        .push(Node::TableDecl {
            name: gain_table,
            len: coefficients.gains.len(),
        })
        .push(Node::TableDecl {
            name: bias_table,
            len: coefficients.biases.len(),
        })
        .push(Node::TableDecl {
            name: "ESUN_values",
            len: coefficients.esun.len(),
        })
        .push(Node::ScalarDecl { name: "distance" })
        .push(Node::ScalarDecl { name: "sun_elev" })
        .push(Node::TableAssign {
            name: gain_table,
            values: coefficients.gains.to_vec(),
        })
        .push(Node::TableAssign {
            name: bias_table,
            values: coefficients.biases.to_vec(),
        })
        .push(Node::ScalarAssign {
            name: "distance",
            value: geometry.earth_sun_distance,
        })
        .push(Node::ScalarAssign {
            name: "sun_elev",
            value: geometry.sun_elevation,
        })
        .push(Node::TableAssign {
            name: "ESUN_values",
            values: coefficients.esun.to_vec(),
        });

    // Highest band first, following the reference job layout. Radiance
    // nodes are n10+k, reflectance nodes n25+k.
    for k in (0..coefficients.gains.len()).rev() {
        let radiance = format!("n{}_memory", 10 + k);
        let reflectance = format!("n{}_memory", 25 + k);
        graph.push(Node::Define {
            name: radiance.clone(),
            expr: radiance_expr(ref_base + k as u32, gain_table, bias_table, k),
        });
        graph.push(Node::Define {
            name: reflectance,
            expr: reflectance_expr(&radiance, k),
        });
    }

    let stacked = (0..coefficients.gains.len())
        .map(|k| format!("n{}_memory", 25 + k))
        .collect::<Vec<_>>()
        .join(" , ");
    graph.push(Node::Assign {
        target: "n32".into(),
        expr: format!("STACKLAYERS ( {stacked} ) "),
    });
    graph
}

/// NDVI: (NIR - RED) / (NIR + RED), zero on a zero denominator, then
/// clamped to zero outside [-1, 1].
pub fn ndvi_graph(source_img: &Path, ndvi_img: &Path) -> ComputationGraph {
    normalized_index_graph(source_img, ndvi_img, &format!("n1({NIR_BAND})"))
}

/// WDRI: NDVI over a 0.1-weighted NIR, same guard and clamp.
pub fn wdri_graph(source_img: &Path, wdri_img: &Path) -> ComputationGraph {
    normalized_index_graph(source_img, wdri_img, &format!("n1({NIR_BAND}) * 0.1"))
}

fn normalized_index_graph(source_img: &Path, out_img: &Path, nir: &str) -> ComputationGraph {
    let red = format!("n1({RED_BAND})");
    let mut graph = ComputationGraph::new();
    graph
        .push(Node::RasterInput {
            keyword: "Float",
            name: "n1".into(),
            options: options::RESAMPLED_INPUT,
            path: source_img.to_path_buf(),
        })
        .push(Node::RasterOutput {
            keyword: "Float",
            name: "n5".into(),
            disposition: "NEW",
            options: options::FLOAT_OUTPUT.to_string(),
            path: out_img.to_path_buf(),
        })
        .push(Node::Define {
            name: "n3_memory".into(),
            expr: format!(
                "Float(EITHER 0 IF ( {nir} + {red} == 0 ) OR (({nir} - {red}) / ({nir} + {red}) )OTHERWISE )"
            ),
        })
        .push(Node::Assign {
            target: "n5".into(),
            expr: "EITHER 0 IF ( $n3_memory < -1 OR $n3_memory > 1 ) OR $n3_memory OTHERWISE "
                .into(),
        });
    graph
}

/// MSAVI: (2*NIR + 1 - sqrt((2*NIR + 1)^2 - 8*(NIR - RED))) / 2. The square
/// root is deliberately unguarded, matching the reference formula: a noisy
/// scene can drive the discriminant negative and the engine's runtime
/// behavior is inherited.
pub fn msavi_graph(source_img: &Path, msavi_img: &Path) -> ComputationGraph {
    let mut graph = ComputationGraph::new();
    graph
        .push(Node::RasterInput {
            keyword: "Float",
            name: "n1".into(),
            options: options::PLAIN_INPUT,
            path: source_img.to_path_buf(),
        })
        .push(Node::RasterTemp { name: "n4_temp".into() })
        .push(Node::RasterTemp { name: "n5_temp".into() })
        .push(Node::RasterOutput {
            keyword: "Float",
            name: "n13".into(),
            disposition: "DELETE_IF_EXISTING",
            options: options::FLOAT_OUTPUT.to_string(),
            path: msavi_img.to_path_buf(),
        })
        .push(Node::Assign {
            target: "n5_temp".into(),
            expr: format!("n1({NIR_BAND}) * 1"),
        })
        .push(Node::Assign {
            target: "n4_temp".into(),
            expr: format!("n1({RED_BAND}) * 1"),
        })
        .push(Node::Define {
            name: "n10_memory".into(),
            expr: "Float(((2 * $n5_temp) + 1))".into(),
        })
        .push(Node::Define {
            name: "n7_memory".into(),
            expr: "Float( ( (2 * $n5_temp) + 1 )  POWER 2 - 8 * ($n5_temp - $n4_temp) )".into(),
        })
        .push(Node::Define {
            name: "n11_memory".into(),
            expr: "Float(SQRT ( $n7_memory ) )".into(),
        })
        .push(Node::Assign {
            target: "n13".into(),
            expr: "($n10_memory - $n11_memory) / 2".into(),
        });
    graph
}
