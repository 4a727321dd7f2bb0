mod test_intersect_basic;
