mod test_assemble;
mod test_geometry;
mod test_time_scale;
