mod test_record;
