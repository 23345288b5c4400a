//! Network layers over channel-last patches.
//!
//! Convolutions run one output row per rayon task.

use rayon::prelude::*;
use wx_common::{Patch, WxError, WxResult};

/// Standardize each channel: `(x - mean) / std`. A zero std divides by one.
pub fn normalize(input: &mut Patch, mean: &[f32], std: &[f32]) -> WxResult<()> {
    input.expect_channels(mean.len())?;
    if std.len() != mean.len() {
        return Err(WxError::Inference(format!(
            "normalization has {} means but {} stds",
            mean.len(),
            std.len()
        )));
    }
    let channels = input.channels();
    input
        .data_mut()
        .par_chunks_mut(channels.max(1))
        .for_each(|px| {
            for (ch, v) in px.iter_mut().enumerate() {
                let s = if std[ch] == 0.0 { 1.0 } else { std[ch] };
                *v = (*v - mean[ch]) / s;
            }
        });
    Ok(())
}

/// Rectified linear unit, in place.
pub fn relu(patch: &mut Patch) {
    patch.data_mut().par_iter_mut().for_each(|v| *v = v.max(0.0));
}

/// 2D convolution, stride 1, no padding.
///
/// Output is `(width - k + 1) x (height - k + 1) x out_channels`.
/// `weight` is `[out][in][k][k]`.
pub fn conv2d_valid(
    input: &Patch,
    weight: &[f32],
    bias: &[f32],
    out_channels: usize,
    k: usize,
) -> WxResult<Patch> {
    let (width, height, in_channels) = input.shape();
    if width < k || height < k {
        return Err(WxError::invalid_parameter(
            "patch_size",
            format!("{}x{} patch is smaller than the {}x{} kernel", width, height, k, k),
        ));
    }
    check_weights(weight, bias, out_channels * in_channels * k * k, out_channels)?;

    let out_w = width - k + 1;
    let out_h = height - k + 1;
    let mut out = vec![0.0f32; out_w * out_h * out_channels];

    out.par_chunks_mut(out_w * out_channels)
        .enumerate()
        .for_each(|(oy, row)| {
            for ox in 0..out_w {
                let px = &mut row[ox * out_channels..(ox + 1) * out_channels];
                px.copy_from_slice(bias);
                for ky in 0..k {
                    for kx in 0..k {
                        let inp = input.pixel(oy + ky, ox + kx);
                        for (o, acc) in px.iter_mut().enumerate() {
                            let mut sum = 0.0;
                            for (ci, &x) in inp.iter().enumerate() {
                                sum += weight[((o * in_channels + ci) * k + ky) * k + kx] * x;
                            }
                            *acc += sum;
                        }
                    }
                }
            }
        });

    Patch::new(out_w, out_h, out_channels, out)
}

/// 2D transposed convolution, stride 1, no padding.
///
/// Output is `(width + k - 1) x (height + k - 1) x out_channels`, undoing the
/// shrink of [`conv2d_valid`]. `weight` is `[in][out][k][k]`.
pub fn conv_transpose2d(
    input: &Patch,
    weight: &[f32],
    bias: &[f32],
    out_channels: usize,
    k: usize,
) -> WxResult<Patch> {
    let (width, height, in_channels) = input.shape();
    check_weights(weight, bias, in_channels * out_channels * k * k, out_channels)?;

    let out_w = width + k - 1;
    let out_h = height + k - 1;
    let mut out = vec![0.0f32; out_w * out_h * out_channels];

    out.par_chunks_mut(out_w * out_channels)
        .enumerate()
        .for_each(|(oy, row)| {
            for ox in 0..out_w {
                let px = &mut row[ox * out_channels..(ox + 1) * out_channels];
                px.copy_from_slice(bias);
                for ky in 0..k {
                    // Source pixel (oy - ky, ox - kx) must lie inside the input
                    let Some(iy) = oy.checked_sub(ky).filter(|&y| y < height) else {
                        continue;
                    };
                    for kx in 0..k {
                        let Some(ix) = ox.checked_sub(kx).filter(|&x| x < width) else {
                            continue;
                        };
                        let inp = input.pixel(iy, ix);
                        for (o, acc) in px.iter_mut().enumerate() {
                            let mut sum = 0.0;
                            for (ci, &x) in inp.iter().enumerate() {
                                sum += weight[((ci * out_channels + o) * k + ky) * k + kx] * x;
                            }
                            *acc += sum;
                        }
                    }
                }
            }
        });

    Patch::new(out_w, out_h, out_channels, out)
}

/// Fully connected layer applied to every pixel. `weight` is `[out][in]`.
pub fn dense(input: &Patch, weight: &[f32], bias: &[f32], out_channels: usize) -> WxResult<Patch> {
    let (width, height, in_channels) = input.shape();
    check_weights(weight, bias, out_channels * in_channels, out_channels)?;

    let out: Vec<f32> = input
        .data()
        .par_chunks(in_channels.max(1))
        .flat_map_iter(|px| {
            (0..out_channels).map(move |o| {
                let row = &weight[o * in_channels..(o + 1) * in_channels];
                bias[o] + row.iter().zip(px).map(|(w, x)| w * x).sum::<f32>()
            })
        })
        .collect();

    Patch::new(width, height, out_channels, out)
}

fn check_weights(weight: &[f32], bias: &[f32], weight_len: usize, bias_len: usize) -> WxResult<()> {
    if weight.len() != weight_len || bias.len() != bias_len {
        return Err(WxError::Inference(format!(
            "layer expects {} weights and {} biases, got {} and {}",
            weight_len,
            bias_len,
            weight.len(),
            bias.len()
        )));
    }
    Ok(())
}
