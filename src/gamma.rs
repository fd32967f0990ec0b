// sRGB <-> linear-light conversion tables.
// Ink edges are mixed into the camera image in linear light so anti-aliased
// strokes don't get dark fringes; the tables keep that off the powf path.

pub struct GammaLut {
    // sRGB byte -> linear [0,1]
    to_linear: [f32; 256],
    // linear [0,1] quantized to LINEAR_STEPS -> sRGB byte
    to_srgb: [u8; LINEAR_STEPS],
}

const LINEAR_STEPS: usize = 4096;

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) }
}

fn linear_to_srgb(l: f32) -> f32 {
    if l <= 0.003_130_8 { 12.92 * l } else { 1.055 * l.powf(1.0 / 2.4) - 0.055 }
}

impl GammaLut {
    pub fn new() -> Self {
        let mut to_linear = [0.0f32; 256];
        for (v, slot) in to_linear.iter_mut().enumerate() {
            *slot = srgb_to_linear(v as f32 / 255.0);
        }

        let mut to_srgb = [0u8; LINEAR_STEPS];
        let top = (LINEAR_STEPS - 1) as f32;
        for (i, slot) in to_srgb.iter_mut().enumerate() {
            let s = linear_to_srgb(i as f32 / top);
            *slot = (s * 255.0).round().clamp(0.0, 255.0) as u8;
        }

        Self { to_linear, to_srgb }
    }

    #[inline]
    pub fn srgb_u8_to_linear(&self, v: u8) -> f32 {
        self.to_linear[v as usize]
    }

    #[inline]
    pub fn linear_to_srgb_u8(&self, l: f32) -> u8 {
        let idx = (l.clamp(0.0, 1.0) * (LINEAR_STEPS - 1) as f32).round() as usize;
        self.to_srgb[idx]
    }
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new()
    }
}
