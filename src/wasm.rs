//! WebAssembly bindings for advent-box

use crate::door::DoorCell;
use crate::partition::{Face, RegionSet};
use crate::pipeline::{rgba_regions, Completion, Generation, TexturePipeline};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmBoxSlicer {
    pipeline: TexturePipeline,
}

#[wasm_bindgen]
impl WasmBoxSlicer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmBoxSlicer {
        WasmBoxSlicer { pipeline: TexturePipeline::new() }
    }

    /// Start a new upload and return its generation. Pass it back to
    /// `process_image` with that upload's pixels.
    #[wasm_bindgen]
    pub fn begin_upload(&mut self) -> f64 {
        self.pipeline.begin().value() as f64
    }

    #[wasm_bindgen]
    pub fn clear(&mut self) {
        self.pipeline.clear();
    }

    /// Slice raw RGBA pixels (as read from a canvas) into face regions.
    ///
    /// Returns an object `{front, top, bottom, left, right}` where each value
    /// is `{width, height, data: Uint8ClampedArray}`, or `null` when the image
    /// could not be sliced or a newer upload has started since `generation`.
    #[wasm_bindgen]
    pub fn process_image(
        &mut self,
        generation: f64,
        image_data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<JsValue, JsValue> {
        let generation = Generation::from_raw(generation as u64);
        let result = rgba_regions(image_data.to_vec(), width, height);
        if let Err(e) = &result {
            web_sys::console::warn_1(&JsValue::from_str(&e.to_string()));
        }

        match self.pipeline.complete(generation, result) {
            Completion::Applied => match self.pipeline.current() {
                Some(regions) => regions_to_js(regions),
                None => Ok(JsValue::NULL),
            },
            Completion::Failed | Completion::Stale => Ok(JsValue::NULL),
        }
    }

    /// `[offsetU, offsetV, repeatU, repeatV]` for a door.
    #[wasm_bindgen]
    pub fn door_uv(&self, day: u32) -> Result<Vec<f32>, JsValue> {
        let cell = DoorCell::for_day(day).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(vec![cell.offset[0], cell.offset[1], cell.repeat[0], cell.repeat[1]])
    }

    /// Whether the box should show textures or flat colour.
    #[wasm_bindgen]
    pub fn is_textured(&self) -> bool {
        self.pipeline.materials().is_textured()
    }
}

impl Default for WasmBoxSlicer {
    fn default() -> Self {
        Self::new()
    }
}

fn regions_to_js(regions: &RegionSet) -> Result<JsValue, JsValue> {
    let result = js_sys::Object::new();
    for face in Face::ALL {
        let img = regions.get(face);
        let entry = js_sys::Object::new();
        js_sys::Reflect::set(&entry, &"width".into(), &img.width().into())?;
        js_sys::Reflect::set(&entry, &"height".into(), &img.height().into())?;
        let data = js_sys::Uint8ClampedArray::from(img.as_raw().as_slice());
        js_sys::Reflect::set(&entry, &"data".into(), &data)?;
        js_sys::Reflect::set(&result, &face.name().into(), &entry)?;
    }
    Ok(result.into())
}
