/// Widget calls the property controls need from the immediate-mode UI library.
///
/// Each editing call returns `true` when the user changed the value this frame;
/// the value is then already updated in place.
pub trait Widgets {
    fn text(&mut self, text: &str);

    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool;

    fn slider_int(&mut self, label: &str, value: &mut i32, min: i32, max: i32) -> bool;

    fn slider_float(&mut self, label: &str, value: &mut f32, min: f32, max: f32) -> bool;

    fn slider_float2(&mut self, label: &str, value: &mut [f32; 2], min: f32, max: f32) -> bool;

    fn slider_float3(&mut self, label: &str, value: &mut [f32; 3], min: f32, max: f32) -> bool;

    fn slider_float4(&mut self, label: &str, value: &mut [f32; 4], min: f32, max: f32) -> bool;

    fn color_edit3(&mut self, label: &str, value: &mut [f32; 3]) -> bool;

    fn color_edit4(&mut self, label: &str, value: &mut [f32; 4]) -> bool;
}
