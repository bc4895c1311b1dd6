mod test_tracking;
