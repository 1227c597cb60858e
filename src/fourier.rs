//! Discrete Fourier transforms along linear dimensions.
//!
//! The direction follows the dimension's `complex_fft` flag: a dimension in
//! ascending order (`complex_fft = false`) is transformed forward into FFT
//! output order, and a dimension already in FFT output order is transformed
//! back. Either way the dimension is replaced by its reciprocal, so calling
//! [`fft`] twice on the same axis restores the original dataset.
//!
//! Coordinate offsets on both sides of the transform are honoured through
//! phase factors, so the result samples the continuous transform at the
//! coordinates of the swapped dimension.

use csdm_core::{
    ComponentArray, CsdmError, CsdmResult, DependentVariable, Dimension, LinearDimension,
    Quantity, Unit,
};
use ndarray::{ArrayD, Axis};
use num::complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

/// Transforms every dependent variable along dimension `axis` and replaces
/// the dimension with its reciprocal.
///
/// Dependent variables must already be shaped onto the grid, with components
/// on array axis 0 and dimension `i` on array axis `dimensions.len() - i`.
/// Real components become complex: `complex64` for `float32`/`complex64`
/// inputs and `complex128` otherwise.
pub fn fft(
    dimensions: &mut [Dimension],
    variables: &mut [DependentVariable],
    axis: usize,
) -> CsdmResult<()> {
    let rank = dimensions.len();
    let dimension = dimensions.get(axis).ok_or_else(|| {
        CsdmError::InvalidValue(format!(
            "dimension index {axis} is out of range for {rank} dimensions"
        ))
    })?;
    let linear = match dimension {
        Dimension::Linear(linear) => linear,
        other => {
            return Err(CsdmError::NotImplemented(format!(
                "Fourier transform is only implemented for LinearDimension, found {}",
                other.subtype_name()
            )))
        }
    };

    let array_axis = rank - axis;
    let transformed = variables
        .iter()
        .map(|variable| transform_axis(linear, variable.components(), array_axis))
        .collect::<CsdmResult<Vec<_>>>()?;
    let swapped = linear.swapped_with_reciprocal()?;

    log::debug!(
        "{} Fourier transform along dimension {axis} ({} points)",
        if linear.complex_fft() { "inverse" } else { "forward" },
        linear.count()
    );
    for (variable, components) in variables.iter_mut().zip(transformed) {
        variable.set_components(components)?;
    }
    dimensions[axis] = Dimension::Linear(swapped);
    Ok(())
}

/// Transforms `components` along `array_axis`, which must be sampled by
/// `dimension`. The dimension itself is left untouched.
pub fn transform_axis(
    dimension: &LinearDimension,
    components: &ComponentArray,
    array_axis: usize,
) -> CsdmResult<ComponentArray> {
    let shape = components.shape();
    if array_axis >= shape.len() || shape[array_axis] != dimension.count() {
        return Err(CsdmError::InvalidValue(format!(
            "array axis {array_axis} of shape {shape:?} does not match a dimension of count {}",
            dimension.count()
        )));
    }
    let output_type = components.numeric_type().complex_counterpart();

    let plan = AxisPlan::new(dimension)?;
    let mut data: ArrayD<Complex64> = components.to_complex128();
    let mut buffer = vec![Complex64::new(0.0, 0.0); dimension.count()];
    for mut lane in data.lanes_mut(Axis(array_axis)) {
        for (slot, value) in buffer.iter_mut().zip(lane.iter()) {
            *slot = *value;
        }
        plan.apply(&mut buffer);
        for (value, slot) in lane.iter_mut().zip(&buffer) {
            *value = *slot;
        }
    }
    Ok(ComponentArray::from_complex128(&data, output_type))
}

/// Precomputed phase factors and FFT for one dimension.
struct AxisPlan {
    forward: bool,
    /// Phase applied to the input lane.
    before: Vec<Complex64>,
    /// Phase applied to the output lane.
    after: Vec<Complex64>,
    /// Weight of the zero-index sample; halved for aperiodic signals.
    edge_scale: f64,
    fft: Arc<dyn Fft<f64>>,
}

impl AxisPlan {
    fn new(dimension: &LinearDimension) -> CsdmResult<Self> {
        let n = dimension.count();
        let half = (n / 2) as f64;
        let unit = dimension.unit();
        let reciprocal_unit = unit.pow(-1);
        let offset = dimension.coordinates_offset().value();
        let reciprocal_offset =
            value_in(dimension.reciprocal().coordinates_offset(), &reciprocal_unit)?;
        let mut planner = FftPlanner::<f64>::new();

        if dimension.complex_fft() {
            // frequency-like: coordinates are centred and include the offset
            let frequencies = dimension.coordinates();
            let step = dimension.reciprocal_increment().value();
            Ok(Self {
                forward: false,
                before: frequencies
                    .iter()
                    .map(|f| phase(reciprocal_offset * f))
                    .collect(),
                after: (0..n).map(|k| phase(offset * k as f64 * step)).collect(),
                edge_scale: edge_scale(dimension.reciprocal().period()),
                fft: planner.plan_fft_inverse(n),
            })
        } else {
            let step = dimension.increment().value();
            let frequency_step = 1.0 / (n as f64 * step);
            Ok(Self {
                forward: true,
                before: (0..n)
                    .map(|k| phase(-reciprocal_offset * k as f64 * step))
                    .collect(),
                after: (0..n)
                    .map(|m| {
                        let frequency = (m as f64 - half) * frequency_step + reciprocal_offset;
                        phase(-offset * frequency)
                    })
                    .collect(),
                edge_scale: edge_scale(dimension.period()),
                fft: planner.plan_fft_forward(n),
            })
        }
    }

    fn apply(&self, lane: &mut [Complex64]) {
        let n = lane.len();
        let half = n / 2;
        for (value, factor) in lane.iter_mut().zip(&self.before) {
            *value *= factor;
        }
        if self.forward {
            lane[0] /= self.edge_scale;
            self.fft.process(lane);
            // fftshift
            lane.rotate_right(half);
        } else {
            // ifftshift
            lane.rotate_left(half);
            self.fft.process(lane);
            let norm = 1.0 / n as f64;
            for value in lane.iter_mut() {
                *value *= norm;
            }
            lane[0] *= self.edge_scale;
        }
        for (value, factor) in lane.iter_mut().zip(&self.after) {
            *value *= factor;
        }
    }
}

/// `exp(2πi x)`
fn phase(x: f64) -> Complex64 {
    Complex64::from_polar(1.0, 2.0 * PI * x)
}

fn edge_scale(period: &Quantity) -> f64 {
    if period.is_infinite() {
        2.0
    } else {
        1.0
    }
}

/// Zero offsets carry no unit information worth converting.
fn value_in(quantity: &Quantity, unit: &Unit) -> CsdmResult<f64> {
    if quantity.value() == 0.0 {
        return Ok(0.0);
    }
    Ok(quantity.value_in(unit)?)
}
