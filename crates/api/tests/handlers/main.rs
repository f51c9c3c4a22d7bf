mod middleware_test;
mod scheduling_test;
mod test_utils;
mod timetable_test;
