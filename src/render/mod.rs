//! `vello_cpu` plumbing shared by the rasterizer and the scene compositor.

pub(crate) mod cpu;
