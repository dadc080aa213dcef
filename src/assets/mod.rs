pub(crate) mod bitmap_font;
pub(crate) mod decode;
pub(crate) mod font;
